//! Error types for the session channel boundary

use thiserror::Error;

/// Result type for channel adapter operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors surfaced by a session channel adapter
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Operation requires an established channel
    #[error("channel not established")]
    NotConnected,

    /// The underlying transport rejected the operation
    #[error("transport failure: {0}")]
    Transport(String),
}
