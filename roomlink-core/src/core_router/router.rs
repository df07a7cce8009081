//! Message routing
//!
//! Translates raw channel events into outward notifications and builds the
//! acknowledgment for every inbound command.

use super::broadcaster::EventBroadcaster;
use super::events::{message_types, RemoteControlEvent};
use crate::core_channel::{Availability, CommandAck, InboundCommand, PeerAddress, PresenceUpdate};
use crate::metrics::{
    COMMANDS_RECEIVED, COMMAND_DECODE_FAILURES, PEER_DEPARTURES, UPDATES_RELAYED,
};
use metrics::counter;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Router for inbound channel traffic
pub struct MessageRouter {
    notifier: EventBroadcaster,
}

impl MessageRouter {
    /// Create a router emitting through the given broadcaster
    pub fn new(notifier: EventBroadcaster) -> Self {
        Self { notifier }
    }

    /// Handle a command from a remote peer
    ///
    /// Emits a `RemoteMessage` notification and returns the acknowledgment
    /// for the sender. The acknowledgment is produced for every command;
    /// a payload that fails to decode degrades to an empty payload without
    /// affecting the protocol-level reply.
    pub fn handle_command(&self, command: &InboundCommand) -> CommandAck {
        counter!(COMMANDS_RECEIVED).increment(1);
        debug!(
            from = %command.from,
            command_type = %command.command_type,
            "remote command received"
        );

        let data = decode_payload(&command.body);
        self.notifier.emit(RemoteControlEvent::RemoteMessage {
            message_type: command.command_type.clone(),
            data,
        });

        CommandAck {
            request_id: command.id.clone(),
            to: command.from.clone(),
            success: true,
        }
    }

    /// Handle a presence change from the channel
    ///
    /// A peer becoming unavailable produces a peer-left notification whose
    /// payload carries a pre-built cleanup message for the application
    /// layer. Nothing is sent back over the channel.
    pub fn handle_presence(&self, presence: &PresenceUpdate) {
        match presence.availability {
            Availability::Unavailable => {
                counter!(PEER_DEPARTURES).increment(1);
                info!(peer = %presence.from, "peer left the channel");

                let cleanup = json!({
                    "type": message_types::WIRELESS_SESSION_CLEANUP,
                    "peer": presence.from.as_str(),
                });
                self.notifier.emit(RemoteControlEvent::RemoteMessage {
                    message_type: message_types::PEER_LEFT.to_string(),
                    data: json!({
                        "from": presence.from.as_str(),
                        "data": cleanup,
                    }),
                });
            }
            Availability::Available => {}
        }
    }

    /// Handle a message routed through the channel by the application layer
    ///
    /// Known remote-control-update messages are re-emitted toward the
    /// addressed peer; unknown kinds are ignored for forward compatibility.
    pub fn handle_application_message(&self, kind: &str, from: &PeerAddress, data: Value) {
        if kind == message_types::REMOTE_CONTROL_UPDATE {
            counter!(UPDATES_RELAYED).increment(1);
            self.notifier.emit(RemoteControlEvent::ProxyMessage {
                from: from.clone(),
                data,
            });
        } else {
            debug!(kind, "ignoring unhandled application message kind");
        }
    }
}

/// Decode a command payload, substituting an empty object on failure
fn decode_payload(body: &str) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(error) => {
            counter!(COMMAND_DECODE_FAILURES).increment(1);
            warn!(%error, "failed to decode command payload; substituting empty payload");
            Value::Object(Map::new())
        }
    }
}
