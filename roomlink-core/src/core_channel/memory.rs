//! In-memory session channel
//!
//! Scriptable [`SessionChannel`] implementation backing the integration
//! tests and the demo CLI. Inbound events are injected by the test or demo
//! driver; outbound messages are recorded instead of hitting a wire.

use super::errors::{ChannelError, ChannelResult};
use super::types::{
    Availability, ChannelEvent, ChannelHandle, CommandAck, ConnectOptions, InboundCommand,
    PeerAddress, PresenceUpdate,
};
use super::SessionChannel;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// A message recorded by [`MemoryChannel::send_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: PeerAddress,
    pub kind: String,
    pub data: Value,
}

#[derive(Default)]
struct Inner {
    connected: bool,
    lock: String,
    status: Map<String, Value>,
    events_tx: Option<mpsc::UnboundedSender<ChannelEvent>>,
    events_rx: Option<mpsc::UnboundedReceiver<ChannelEvent>>,
    sent: Vec<SentMessage>,
    connect_calls: u32,
    set_lock_calls: u32,
    fail_set_lock: bool,
    fail_send: bool,
}

/// In-memory channel with failure injection
pub struct MemoryChannel {
    room_id: String,
    inner: Mutex<Inner>,
}

impl MemoryChannel {
    /// Create a disconnected in-memory channel for the given room
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Inject an inbound command; returns the receiver for its acknowledgment
    pub fn inject_command(
        &self,
        id: impl Into<String>,
        from: impl Into<PeerAddress>,
        command_type: impl Into<String>,
        body: impl Into<String>,
    ) -> oneshot::Receiver<CommandAck> {
        let (reply, ack) = oneshot::channel();
        let command = InboundCommand {
            id: id.into(),
            from: from.into(),
            command_type: command_type.into(),
            body: body.into(),
        };
        self.deliver(ChannelEvent::Command { command, reply });
        ack
    }

    /// Inject a presence change for a peer
    pub fn inject_presence(&self, from: impl Into<PeerAddress>, availability: Availability) {
        self.deliver(ChannelEvent::Presence(PresenceUpdate {
            from: from.into(),
            availability,
        }));
    }

    /// Inject a message routed through the channel by the application layer
    pub fn inject_application_message(
        &self,
        kind: impl Into<String>,
        from: impl Into<PeerAddress>,
        data: Value,
    ) {
        self.deliver(ChannelEvent::ApplicationMessage {
            kind: kind.into(),
            from: from.into(),
            data,
        });
    }

    /// Simulate unexpected channel loss
    pub fn force_disconnect(&self, reason: impl Into<String>) {
        let tx = {
            let mut inner = self.inner.lock().unwrap();
            inner.connected = false;
            inner.events_tx.take()
        };
        if let Some(tx) = tx {
            let _ = tx.send(ChannelEvent::Disconnected {
                reason: Some(reason.into()),
            });
        }
    }

    /// Messages recorded so far
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// Current lock value, readable regardless of connection state
    pub fn current_lock(&self) -> String {
        self.inner.lock().unwrap().lock.clone()
    }

    /// Current merged status object
    pub fn current_status(&self) -> Map<String, Value> {
        self.inner.lock().unwrap().status.clone()
    }

    /// Number of `connect` calls observed
    pub fn connect_calls(&self) -> u32 {
        self.inner.lock().unwrap().connect_calls
    }

    /// Number of `set_lock` calls that reached the channel
    pub fn set_lock_calls(&self) -> u32 {
        self.inner.lock().unwrap().set_lock_calls
    }

    /// Make subsequent `set_lock` calls fail with a transport error
    pub fn fail_set_lock(&self, fail: bool) {
        self.inner.lock().unwrap().fail_set_lock = fail;
    }

    /// Make subsequent `send_message` calls fail with a transport error
    pub fn fail_send(&self, fail: bool) {
        self.inner.lock().unwrap().fail_send = fail;
    }

    fn deliver(&self, event: ChannelEvent) {
        let inner = self.inner.lock().unwrap();
        match &inner.events_tx {
            Some(tx) => {
                let _ = tx.send(event);
            }
            None => debug!("dropping injected event; channel not established"),
        }
    }
}

#[async_trait]
impl SessionChannel for MemoryChannel {
    async fn connect(&self, _options: &ConnectOptions) -> ChannelResult<ChannelHandle> {
        let mut inner = self.inner.lock().unwrap();
        inner.connect_calls += 1;
        if !inner.connected {
            let (tx, rx) = mpsc::unbounded_channel();
            inner.connected = true;
            inner.events_tx = Some(tx);
            inner.events_rx = Some(rx);
        }
        Ok(ChannelHandle {
            room_id: self.room_id.clone(),
        })
    }

    async fn disconnect(&self) -> ChannelResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.connected = false;
        inner.events_tx = None;
        inner.events_rx = None;
        Ok(())
    }

    fn room_id(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.connected.then(|| self.room_id.clone())
    }

    fn lock(&self) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.connected.then(|| inner.lock.clone())
    }

    async fn set_lock(&self, lock: &str) -> ChannelResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(ChannelError::NotConnected);
        }
        if inner.fail_set_lock {
            return Err(ChannelError::Transport("lock update rejected".to_string()));
        }
        inner.set_lock_calls += 1;
        inner.lock = lock.to_string();
        Ok(())
    }

    async fn send_message(&self, to: &PeerAddress, kind: &str, data: Value) -> ChannelResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(ChannelError::NotConnected);
        }
        if inner.fail_send {
            return Err(ChannelError::Transport("send rejected".to_string()));
        }
        inner.sent.push(SentMessage {
            to: to.clone(),
            kind: kind.to_string(),
            data,
        });
        Ok(())
    }

    fn update_status(&self, status: Value) -> ChannelResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(ChannelError::NotConnected);
        }
        if let Value::Object(fields) = status {
            for (key, value) in fields {
                inner.status.insert(key, value);
            }
        }
        Ok(())
    }

    fn take_event_stream(&self) -> Option<mpsc::UnboundedReceiver<ChannelEvent>> {
        self.inner.lock().unwrap().events_rx.take()
    }
}
