//! Pairing secrets and join codes

mod join_code;
mod secret;

pub use join_code::JoinCodeManager;
pub use secret::{generate_lock, LOCK_LEN};
