//! Flush scheduling: decouples "a delta arrived" from "observers re-render".
//!
//! The first delta for a message flushes immediately — perceived latency
//! matters most at the start of a response. Later deltas coalesce behind at
//! most one pending flush per message id; whatever accumulates while the
//! timer runs rides along with it. Early flushes use a short delay so
//! formatting appears quickly, then the delay widens for the rest of the
//! stream to cut render churn.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::accumulator::StreamAccumulators;
use crate::store::{MessageId, MessageStore};

const EARLY_FLUSH_DELAY: Duration = Duration::from_millis(8);
const STEADY_FLUSH_DELAY: Duration = Duration::from_millis(16);
const EARLY_FLUSH_COUNT: u32 = 3;

#[derive(Default)]
struct FlushSlot {
    pending: bool,
    first_flush_done: bool,
    scheduled_flushes: u32,
}

pub struct FlushScheduler {
    store: Arc<MessageStore>,
    accumulators: Arc<StreamAccumulators>,
    slots: Arc<Mutex<FxHashMap<MessageId, FlushSlot>>>,
}

impl FlushScheduler {
    #[must_use]
    pub fn new(store: Arc<MessageStore>, accumulators: Arc<StreamAccumulators>) -> Self {
        Self {
            store,
            accumulators,
            slots: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }

    /// Open a flush slot for an exchange. Deltas for unregistered ids are
    /// dropped.
    pub fn register(&self, id: MessageId) {
        self.slots.lock().insert(id, FlushSlot::default());
    }

    /// Close the flush slot. A timer already in flight wakes to find the
    /// accumulator gone and writes nothing.
    pub fn deregister(&self, id: MessageId) {
        self.slots.lock().remove(&id);
    }

    /// Note that a delta was appended for `id` and schedule visibility.
    ///
    /// Must be called from within a tokio runtime.
    pub fn delta_arrived(&self, id: MessageId) {
        let delay = {
            let mut slots = self.slots.lock();
            let Some(slot) = slots.get_mut(&id) else {
                return;
            };
            if !slot.first_flush_done {
                slot.first_flush_done = true;
                drop(slots);
                flush_now(&self.store, &self.accumulators, id);
                return;
            }
            if slot.pending {
                // A flush is already scheduled; this delta rides along.
                return;
            }
            slot.pending = true;
            slot.scheduled_flushes += 1;
            if slot.scheduled_flushes <= EARLY_FLUSH_COUNT {
                EARLY_FLUSH_DELAY
            } else {
                STEADY_FLUSH_DELAY
            }
        };

        let store = Arc::clone(&self.store);
        let accumulators = Arc::clone(&self.accumulators);
        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(slot) = slots.lock().get_mut(&id) {
                slot.pending = false;
            }
            flush_now(&store, &accumulators, id);
        });
    }
}

/// Copy the accumulator state into the store, bypassing any timer.
fn flush_now(store: &MessageStore, accumulators: &StreamAccumulators, id: MessageId) {
    let Some(acc) = accumulators.snapshot(id) else {
        return;
    };
    let reasoning = if acc.reasoning.is_empty() {
        None
    } else {
        Some(acc.reasoning.as_str())
    };
    store.apply_stream_update(id, &acc.content, reasoning);
}
