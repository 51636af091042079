//! Bounded cross-context event queue.
//!
//! Exactly one producer context (the core running the Bluetooth stack) and
//! one consumer context (the USB-side polling core) share this queue. `push`
//! suspends when full - the producer must not silently drop controller
//! events - and `pop` suspends when empty. Slot transitions are atomic
//! across contexts, so the consumer never observes a torn record.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::event::BridgeEvent;

/// Fixed-capacity FIFO of [`BridgeEvent`]s, safe across two cores.
pub struct EventQueue<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, BridgeEvent, N>,
}

impl<const N: usize> EventQueue<N> {
    /// Create an empty queue. `const`, so the queue can live in a `static`
    /// constructed before either executor starts.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a record, suspending the caller until a slot is free.
    ///
    /// Records are never dropped, duplicated, or reordered; capacity
    /// exhaustion manifests as backpressure, not an error.
    pub async fn push(&self, event: BridgeEvent) {
        self.channel.send(event).await;
    }

    /// Dequeue the oldest record, suspending the caller until one exists.
    pub async fn pop(&self) -> BridgeEvent {
        self.channel.receive().await
    }

    /// Dequeue the oldest record if one is ready, without suspending.
    pub fn try_pop(&self) -> Option<BridgeEvent> {
        self.channel.try_receive().ok()
    }

    /// Non-blocking emptiness probe for the polled consumer.
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Number of queued records.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// One drain pass: a lazy iterator yielding queued records until the
    /// queue reports empty. Restartable - call it on every tick of the host
    /// polling loop.
    pub fn drain(&self) -> Drain<'_, N> {
        Drain { queue: self }
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`EventQueue::drain`].
pub struct Drain<'a, const N: usize> {
    queue: &'a EventQueue<N>,
}

impl<const N: usize> Iterator for Drain<'_, N> {
    type Item = BridgeEvent;

    fn next(&mut self) -> Option<BridgeEvent> {
        self.queue.try_pop()
    }
}
