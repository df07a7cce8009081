//! Session coordination
//!
//! The host service: owns the connection lifecycle, wires the join code
//! rotation loop to connection state, and dispatches inbound channel events
//! through the message router.

use super::errors::SessionResult;
use crate::core_channel::{
    ChannelEvent, ChannelHandle, ConnectOptions, PeerAddress, SharedSessionChannel,
};
use crate::core_pairing::JoinCodeManager;
use crate::core_router::{message_types, EventBroadcaster, MessageRouter, RemoteControlEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Coordinator-level connection state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected(ChannelHandle),
}

/// The room host service
///
/// Explicitly constructed around a channel adapter; consumers subscribe to
/// the notification stream and call the public operations below. Any
/// transition into `Disconnected`, voluntary or adapter-forced, cancels the
/// scheduled join code refresh.
pub struct RemoteControlHost {
    channel: SharedSessionChannel,
    join_codes: Arc<JoinCodeManager>,
    router: Arc<MessageRouter>,
    notifier: EventBroadcaster,
    state: Arc<Mutex<ConnectionState>>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl RemoteControlHost {
    /// Create a host service over the given channel adapter
    pub fn new(channel: SharedSessionChannel) -> Self {
        Self::with_broadcaster(channel, EventBroadcaster::default())
    }

    /// Create a host service emitting through a caller-owned broadcaster
    ///
    /// Lets an embedder observe the notification stream it already holds;
    /// also the introspection seam for tests.
    pub fn with_broadcaster(channel: SharedSessionChannel, notifier: EventBroadcaster) -> Self {
        let join_codes = Arc::new(JoinCodeManager::new(
            Arc::clone(&channel),
            notifier.clone(),
        ));
        let router = Arc::new(MessageRouter::new(notifier.clone()));

        Self {
            channel,
            join_codes,
            router,
            notifier,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            dispatch: Mutex::new(None),
        }
    }

    /// Establish the session channel
    ///
    /// Idempotent: while connected, returns the existing handle without
    /// establishing a new channel. Concurrent callers serialize on the
    /// connection state; later callers observe the completed attempt and
    /// receive the same handle, so exactly one channel is established.
    ///
    /// With `options.join_code_refresh` set, the first successful connect
    /// starts the join code rotation loop.
    pub async fn connect(&self, options: ConnectOptions) -> SessionResult<ChannelHandle> {
        let mut state = self.state.lock().await;
        if let ConnectionState::Connected(handle) = &*state {
            debug!("connect requested while connected; reusing channel");
            return Ok(handle.clone());
        }

        *state = ConnectionState::Connecting;
        info!("establishing session channel");
        let handle = match self.channel.connect(&options).await {
            Ok(handle) => handle,
            Err(error) => {
                *state = ConnectionState::Disconnected;
                warn!(%error, "channel establishment failed");
                return Err(error.into());
            }
        };

        if let Some(events) = self.channel.take_event_stream() {
            let task = tokio::spawn(Self::dispatch_events(
                Arc::clone(&self.router),
                Arc::clone(&self.join_codes),
                Arc::clone(&self.state),
                events,
            ));
            if let Some(previous) = self.dispatch.lock().await.replace(task) {
                previous.abort();
            }
        }

        *state = ConnectionState::Connected(handle.clone());
        drop(state);

        info!(room = %handle.room_id, "session channel established");

        if let Some(interval) = options.join_code_refresh {
            self.join_codes.refresh(Some(interval)).await?;
        }

        Ok(handle)
    }

    /// Tear down the session channel
    ///
    /// Cancels any pending join code refresh first, then disconnects the
    /// adapter. Safe to call when not connected.
    pub async fn disconnect(&self) -> SessionResult<()> {
        self.join_codes.cancel_refresh();

        if let Some(task) = self.dispatch.lock().await.take() {
            task.abort();
        }

        let mut state = self.state.lock().await;
        let was_connected = !matches!(*state, ConnectionState::Disconnected);
        *state = ConnectionState::Disconnected;
        drop(state);

        self.channel.disconnect().await?;
        if was_connected {
            info!("session channel closed");
        }
        Ok(())
    }

    /// Send an update message to a remote controller
    ///
    /// Adapter failures propagate unmodified to the caller.
    pub async fn send_message_to_remote_control(
        &self,
        to: &PeerAddress,
        data: Value,
    ) -> SessionResult<()> {
        self.channel
            .send_message(to, message_types::UPDATE_MESSAGE, data)
            .await?;
        Ok(())
    }

    /// Merge a partial status into the host's broadcast presence
    ///
    /// A benign no-op while no channel is established, tolerating updates
    /// that arrive before initialization completes.
    pub fn update_status(&self, new_status: Value) {
        if let Err(error) = self.channel.update_status(new_status) {
            debug!(%error, "status update skipped; channel not ready");
        }
    }

    /// Current join code, empty while disconnected
    pub fn join_code(&self) -> String {
        self.join_codes.join_code()
    }

    /// Rotate the join code on demand
    ///
    /// With `next_interval` set, also (re)starts the rotation loop.
    pub async fn refresh_join_code(&self, next_interval: Option<Duration>) -> SessionResult<()> {
        self.join_codes.refresh(next_interval).await?;
        Ok(())
    }

    /// Subscribe to host notifications
    pub fn subscribe(&self) -> broadcast::Receiver<RemoteControlEvent> {
        self.notifier.subscribe()
    }

    /// Snapshot of the connection state
    pub async fn state(&self) -> ConnectionState {
        self.state.lock().await.clone()
    }

    async fn dispatch_events(
        router: Arc<MessageRouter>,
        join_codes: Arc<JoinCodeManager>,
        state: Arc<Mutex<ConnectionState>>,
        mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    ) {
        while let Some(event) = events.recv().await {
            match event {
                ChannelEvent::Command { command, reply } => {
                    let ack = router.handle_command(&command);
                    if reply.send(ack).is_err() {
                        debug!(request_id = %command.id, "acknowledgment dropped; channel gave up on reply");
                    }
                }
                ChannelEvent::Presence(presence) => {
                    router.handle_presence(&presence);
                }
                ChannelEvent::ApplicationMessage { kind, from, data } => {
                    router.handle_application_message(&kind, &from, data);
                }
                ChannelEvent::Disconnected { reason } => {
                    warn!(
                        reason = reason.as_deref().unwrap_or("unknown"),
                        "channel lost; tearing down session"
                    );
                    // Cancel before anything else so no timer fires against
                    // the dead channel.
                    join_codes.cancel_refresh();
                    *state.lock().await = ConnectionState::Disconnected;
                    break;
                }
            }
        }
    }
}
