//! Process-wide change notifications.
//!
//! Signals carry no payload. An observer treats a signal purely as a cue to
//! re-read the authoritative state, so a burst of rapid mutations can never
//! leave it holding a stale snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cart::CartStore;

/// Buffered signals per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// A payload-free change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Login, logout or expiry changed who is signed in.
    SessionChanged,
    /// The authoritative cart changed.
    CartChanged,
}

impl Signal {
    /// Wire name of the signal.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SessionChanged => "session-changed",
            Self::CartChanged => "cart-changed",
        }
    }
}

/// Shared publish/subscribe bus.
///
/// Every signal goes through one FIFO channel, so a subscriber always sees
/// a session change before the cart change it caused.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Signal>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Broadcast a signal. Having no subscribers is fine.
    pub fn publish(&self, signal: Signal) {
        tracing::trace!(signal = signal.name(), "Publishing signal");
        let _ = self.sender.send(signal);
    }

    /// Start receiving signals published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving end of the bus.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Signal>,
}

impl Subscription {
    /// Wait for the next signal.
    ///
    /// Signals lost to lag are skipped; returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Signal> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Subscriber lagged, skipping signals");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next already-published signal without waiting.
    pub fn try_recv(&mut self) -> Option<Signal> {
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }

    /// Drain every signal published so far.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Header badge showing the cart item count.
///
/// Re-reads [`CartStore::total_item_count`] whenever a signal arrives and
/// never trusts anything but the store.
#[derive(Debug)]
pub struct CartBadge {
    count: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl CartBadge {
    /// Spawn the observer on the current tokio runtime.
    #[must_use]
    pub fn spawn(cart: CartStore, bus: &EventBus) -> Self {
        let count = Arc::new(AtomicU64::new(cart.total_item_count()));
        let mut subscription = bus.subscribe();
        let observed = Arc::clone(&count);

        let task = tokio::spawn(async move {
            while subscription.recv().await.is_some() {
                observed.store(cart.total_item_count(), Ordering::Release);
            }
        });

        Self { count, task }
    }

    /// Count shown on the badge.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

impl Drop for CartBadge {
    fn drop(&mut self) {
        self.task.abort();
    }
}
