//! Message routing and outward notifications
//!
//! Classifies inbound channel events (commands, presence, relayed
//! application messages) into normalized notifications and builds the
//! acknowledgment reply for every inbound command.

mod broadcaster;
mod events;
mod router;

pub use broadcaster::EventBroadcaster;
pub use events::{message_types, RemoteControlEvent};
pub use router::MessageRouter;
