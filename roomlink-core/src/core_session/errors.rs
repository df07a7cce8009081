//! Error types for the session coordinator

use crate::core_channel::ChannelError;
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by the session coordinator's public operations
///
/// Channel adapter failures propagate unmodified; retry policy belongs to
/// the caller.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The channel adapter rejected an operation
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}
