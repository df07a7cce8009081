//! roomlink-core
//!
//! Host-side pairing and message relay for a room device controlled by
//! remote peers over a shared presence-and-messaging channel. The host owns
//! a rotating join code that gatekeeps pairing, routes commands and status
//! between remote controllers and the external application layer, and
//! cleans up after peers that disappear without notice.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  RemoteControlHost   │  connection lifecycle, public operations
//! └────┬───────┬─────────┘
//!      │       │
//!      ▼       ▼
//!  JoinCode  Message
//!  Manager   Router
//!      │       │
//!      └───┬───┘
//!          ▼
//!   SessionChannel (adapter boundary)
//! ```

pub mod config;
pub mod core_channel;
pub mod core_pairing;
pub mod core_router;
pub mod core_session;
pub mod logging;
pub mod metrics;

pub use config::{Config, ConfigError};
pub use core_channel::{
    Availability, ChannelError, ChannelEvent, ChannelHandle, CommandAck, ConnectOptions,
    InboundCommand, MemoryChannel, PeerAddress, PresenceUpdate, SessionChannel,
    SharedSessionChannel,
};
pub use core_pairing::JoinCodeManager;
pub use core_router::{message_types, EventBroadcaster, MessageRouter, RemoteControlEvent};
pub use core_session::{ConnectionState, RemoteControlHost, SessionError, SessionResult};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};
