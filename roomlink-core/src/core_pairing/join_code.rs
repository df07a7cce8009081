//! Join code lifecycle
//!
//! Owns the rotation of the channel lock and the derivation of the join
//! code remote peers use to pair. At most one refresh timer is pending at
//! any time; rotating or disconnecting cancels it before anything else
//! happens.

use super::secret::generate_lock;
use crate::core_channel::{ChannelResult, SharedSessionChannel};
use crate::core_router::{EventBroadcaster, RemoteControlEvent};
use crate::metrics::JOIN_CODE_ROTATIONS;
use metrics::counter;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Slot holding the pending refresh timer, shared with the timer task
type RefreshSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Manager for the channel lock and its derived join code
pub struct JoinCodeManager {
    channel: SharedSessionChannel,
    notifier: EventBroadcaster,
    pending: RefreshSlot,
}

impl JoinCodeManager {
    /// Create a manager over the given channel
    pub fn new(channel: SharedSessionChannel, notifier: EventBroadcaster) -> Self {
        Self {
            channel,
            notifier,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Current join code
    ///
    /// Derived on every read as room identifier + lock, with no separator.
    /// Empty while no channel is established. Rotating the lock invalidates
    /// every previously issued join code.
    pub fn join_code(&self) -> String {
        derive_join_code(&self.channel)
    }

    /// Rotate the channel lock
    ///
    /// Cancels any pending scheduled refresh, applies a freshly generated
    /// lock, and emits a join code notification. With `next_interval` set,
    /// the next rotation is scheduled relative to this one's completion and
    /// its handle is stored before the notification goes out.
    ///
    /// A failed lock update leaves the previous lock authoritative: no
    /// notification, no reschedule, and the error propagates to the caller.
    pub async fn refresh(&self, next_interval: Option<Duration>) -> ChannelResult<()> {
        cancel_pending(&self.pending);
        rotate(&self.channel, &self.notifier, &self.pending, next_interval).await
    }

    /// Cancel the pending scheduled refresh, if any
    ///
    /// Idempotent. Only a timer that is still sleeping can be cancelled; a
    /// rotation already past its timer completes on its own (see
    /// `schedule_next`).
    pub fn cancel_refresh(&self) {
        cancel_pending(&self.pending);
    }
}

fn derive_join_code(channel: &SharedSessionChannel) -> String {
    match (channel.room_id(), channel.lock()) {
        (Some(room), Some(lock)) => format!("{}{}", room, lock),
        _ => String::new(),
    }
}

fn cancel_pending(pending: &RefreshSlot) {
    if let Some(handle) = pending.lock().unwrap().take() {
        handle.abort();
    }
}

async fn rotate(
    channel: &SharedSessionChannel,
    notifier: &EventBroadcaster,
    pending: &RefreshSlot,
    next_interval: Option<Duration>,
) -> ChannelResult<()> {
    let lock = generate_lock();
    channel.set_lock(&lock).await?;
    counter!(JOIN_CODE_ROTATIONS).increment(1);

    // The set_lock round trip may have raced a disconnect; a join code for
    // a dead room must not be announced or rescheduled.
    if channel.room_id().is_none() {
        debug!("channel closed during lock rotation; rotation completes silently");
        return Ok(());
    }

    if let Some(interval) = next_interval {
        schedule_next(channel, notifier, pending, interval);
    }

    let join_code = derive_join_code(channel);
    info!(interval = ?next_interval, "join code rotated");
    notifier.emit(RemoteControlEvent::JoinCodeChanged { join_code });
    Ok(())
}

fn schedule_next(
    channel: &SharedSessionChannel,
    notifier: &EventBroadcaster,
    pending: &RefreshSlot,
    interval: Duration,
) {
    let channel = Arc::clone(channel);
    let notifier = notifier.clone();
    let slot = Arc::clone(pending);

    let handle = tokio::spawn(async move {
        tokio::time::sleep(interval).await;
        // This firing consumes its own handle so that a concurrent cancel
        // cannot abort a lock update already in flight.
        slot.lock().unwrap().take();
        if let Err(error) = rotate(&channel, &notifier, &slot, Some(interval)).await {
            warn!(%error, "scheduled join code rotation failed; rotation loop stopped");
        }
    });

    if let Some(previous) = pending.lock().unwrap().replace(handle) {
        previous.abort();
    }
}
