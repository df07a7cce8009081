//! Data types crossing the session channel boundary

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;

/// Channel-level address of a remote peer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress(pub String);

impl PeerAddress {
    /// Create a new peer address
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PeerAddress {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

/// Options supplied when establishing a session channel
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Interval between automatic join code rotations; None disables the
    /// rotation loop
    pub join_code_refresh: Option<Duration>,
}

/// Handle to an established session channel
///
/// Carries the stable room identity. Repeated `connect` calls on an already
/// connected coordinator return clones of the same handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    /// Stable room identifier for this channel
    pub room_id: String,
}

/// A command received from a remote peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    /// Request id, preserved to correlate the acknowledgment
    pub id: String,

    /// Sender address
    pub from: PeerAddress,

    /// Command type name
    pub command_type: String,

    /// Raw text payload, decoded as JSON by the router
    pub body: String,
}

/// Acknowledgment returned to the sender of an inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAck {
    /// The original request id
    pub request_id: String,

    /// Addressee, the original sender
    pub to: PeerAddress,

    /// Whether the command was accepted
    pub success: bool,
}

/// Peer availability in the shared channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

/// Notification that a peer's availability changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    /// The peer whose availability changed
    pub from: PeerAddress,

    /// New availability state
    pub availability: Availability,
}

/// Events delivered by a session channel adapter
///
/// Commands carry a oneshot reply sender: the adapter expects an
/// acknowledgment for every command, produced synchronously by the router
/// and correlated by the original request id.
#[derive(Debug)]
pub enum ChannelEvent {
    /// A command arrived from a remote peer
    Command {
        command: InboundCommand,
        reply: oneshot::Sender<CommandAck>,
    },

    /// A peer's availability changed
    Presence(PresenceUpdate),

    /// The application layer routed a message through the channel
    ApplicationMessage {
        kind: String,
        from: PeerAddress,
        data: Value,
    },

    /// The channel was lost without a voluntary disconnect
    Disconnected { reason: Option<String> },
}
