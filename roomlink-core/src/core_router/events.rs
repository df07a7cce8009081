//! Outward notifications
//!
//! Events emitted by the host core for consumption by the external
//! application layer.

use crate::core_channel::PeerAddress;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type names used on the notification surface
pub mod message_types {
    /// A remote peer departed without notice; session cleanup may be needed
    pub const PEER_LEFT: &str = "peer-left";

    /// Application-side update destined for a remote controller
    pub const REMOTE_CONTROL_UPDATE: &str = "remote-control-update";

    /// Host-side update message sent to a remote controller
    pub const UPDATE_MESSAGE: &str = "update-message";

    /// Cleanup notification payload built for departed peers
    pub const WIRELESS_SESSION_CLEANUP: &str = "wireless-session-cleanup";
}

/// Notification emitted by the host core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RemoteControlEvent {
    /// The join code changed after a lock rotation
    JoinCodeChanged { join_code: String },

    /// A message arrived for the external application: a decoded remote
    /// command, or a peer-left cleanup signal
    RemoteMessage { message_type: String, data: Value },

    /// An application update to forward toward the addressed remote peer
    ProxyMessage { from: PeerAddress, data: Value },
}

impl RemoteControlEvent {
    /// Message type for RemoteMessage notifications
    pub fn message_type(&self) -> Option<&str> {
        match self {
            RemoteControlEvent::RemoteMessage { message_type, .. } => Some(message_type),
            _ => None,
        }
    }

    /// Check if this is a join code change
    pub fn is_join_code_changed(&self) -> bool {
        matches!(self, RemoteControlEvent::JoinCodeChanged { .. })
    }
}
