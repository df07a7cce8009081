//! Session channel boundary
//!
//! The channel adapter owns connection establishment, the room identity and
//! its mutable lock, low-level message delivery, and presence. The host core
//! consumes it through the [`SessionChannel`] trait and never touches the
//! wire protocol itself.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

mod errors;
mod memory;
mod types;

pub use errors::{ChannelError, ChannelResult};
pub use memory::{MemoryChannel, SentMessage};
pub use types::{
    Availability, ChannelEvent, ChannelHandle, CommandAck, ConnectOptions, InboundCommand,
    PeerAddress, PresenceUpdate,
};

/// Interface to the shared presence-and-messaging channel
///
/// Implementations are external collaborators. The in-tree [`MemoryChannel`]
/// is a scriptable reference implementation used by tests and the demo CLI.
#[async_trait]
pub trait SessionChannel: Send + Sync {
    /// Establish the channel
    async fn connect(&self, options: &ConnectOptions) -> ChannelResult<ChannelHandle>;

    /// Tear down the channel; must be safe when not connected
    async fn disconnect(&self) -> ChannelResult<()>;

    /// Stable room identifier, None while no channel is established
    fn room_id(&self) -> Option<String>;

    /// Current lock (shared secret), None while no channel is established
    fn lock(&self) -> Option<String>;

    /// Replace the channel lock, invalidating previously issued join codes
    async fn set_lock(&self, lock: &str) -> ChannelResult<()>;

    /// Send a message of the given kind to a peer
    async fn send_message(&self, to: &PeerAddress, kind: &str, data: Value) -> ChannelResult<()>;

    /// Merge a partial status object into the host's broadcast presence
    fn update_status(&self, status: Value) -> ChannelResult<()>;

    /// Take the inbound event stream
    ///
    /// Yields the receiver at most once per established channel; the
    /// coordinator takes it right after connecting.
    fn take_event_stream(&self) -> Option<mpsc::UnboundedReceiver<ChannelEvent>>;
}

/// Type alias for a shared session channel
pub type SharedSessionChannel = Arc<dyn SessionChannel>;
