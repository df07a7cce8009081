//! Session coordination for the room host role

mod coordinator;
mod errors;

pub use coordinator::{ConnectionState, RemoteControlHost};
pub use errors::{SessionError, SessionResult};
