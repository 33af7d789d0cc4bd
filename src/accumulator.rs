//! Ephemeral per-message delta buffers.
//!
//! One [`StreamAccumulator`] exists per in-flight exchange, keyed by message
//! id: inserted when the request is issued, appended to on every parsed
//! delta, read by the flush scheduler, and removed when the stream ends —
//! success or failure. Never persisted.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::store::MessageId;

/// Cumulative streamed text for one in-flight response.
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    pub content: String,
    pub reasoning: String,
}

#[derive(Default)]
pub struct StreamAccumulators {
    inner: Mutex<FxHashMap<MessageId, StreamAccumulator>>,
}

impl StreamAccumulators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: MessageId) {
        self.inner.lock().insert(id, StreamAccumulator::default());
    }

    /// Append deltas to the accumulator for `id`. Pure append, no
    /// transformation.
    ///
    /// Returns `false` without effect when no accumulator exists for `id` —
    /// the stream was already finalized or cancelled.
    pub fn append(
        &self,
        id: MessageId,
        content_delta: Option<&str>,
        reasoning_delta: Option<&str>,
    ) -> bool {
        if content_delta.is_none() && reasoning_delta.is_none() {
            return false;
        }
        let mut inner = self.inner.lock();
        let Some(accumulator) = inner.get_mut(&id) else {
            return false;
        };
        if let Some(delta) = content_delta {
            accumulator.content.push_str(delta);
        }
        if let Some(delta) = reasoning_delta {
            accumulator.reasoning.push_str(delta);
        }
        true
    }

    #[must_use]
    pub fn snapshot(&self, id: MessageId) -> Option<StreamAccumulator> {
        self.inner.lock().get(&id).cloned()
    }

    pub fn remove(&self, id: MessageId) -> Option<StreamAccumulator> {
        self.inner.lock().remove(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> MessageId {
        MessageId::from_u128(n)
    }

    #[test]
    fn test_append_accumulates_both_channels() {
        let accumulators = StreamAccumulators::new();
        accumulators.insert(id(1));

        assert!(accumulators.append(id(1), Some("Hel"), None));
        assert!(accumulators.append(id(1), Some("lo"), Some("Let")));
        assert!(accumulators.append(id(1), None, Some("me")));

        let acc = accumulators.snapshot(id(1)).unwrap();
        assert_eq!(acc.content, "Hello");
        assert_eq!(acc.reasoning, "Letme");
    }

    #[test]
    fn test_append_order_matches_single_pass() {
        let split = StreamAccumulators::new();
        split.insert(id(1));
        split.append(id(1), Some("Hel"), None);
        split.append(id(1), Some("lo"), None);
        split.append(id(1), Some(" World"), None);

        let whole = StreamAccumulators::new();
        whole.insert(id(2));
        whole.append(id(2), Some("Hello"), None);
        whole.append(id(2), Some(" World"), None);

        assert_eq!(
            split.snapshot(id(1)).unwrap().content,
            whole.snapshot(id(2)).unwrap().content
        );
    }

    #[test]
    fn test_append_unknown_id_is_noop() {
        let accumulators = StreamAccumulators::new();
        assert!(!accumulators.append(id(42), Some("ghost"), None));
        assert!(accumulators.snapshot(id(42)).is_none());
        assert!(accumulators.is_empty());
    }

    #[test]
    fn test_append_without_deltas_is_noop() {
        let accumulators = StreamAccumulators::new();
        accumulators.insert(id(1));
        assert!(!accumulators.append(id(1), None, None));
        let acc = accumulators.snapshot(id(1)).unwrap();
        assert!(acc.content.is_empty());
        assert!(acc.reasoning.is_empty());
    }

    #[test]
    fn test_remove_ends_the_lifecycle() {
        let accumulators = StreamAccumulators::new();
        accumulators.insert(id(1));
        accumulators.append(id(1), Some("text"), None);

        let removed = accumulators.remove(id(1)).unwrap();
        assert_eq!(removed.content, "text");
        assert!(!accumulators.append(id(1), Some("late"), None));
        assert!(accumulators.is_empty());
    }

    #[test]
    fn test_ids_are_independent() {
        let accumulators = StreamAccumulators::new();
        accumulators.insert(id(1));
        accumulators.insert(id(2));
        accumulators.append(id(1), Some("one"), None);
        accumulators.append(id(2), None, Some("two"));

        assert_eq!(accumulators.snapshot(id(1)).unwrap().content, "one");
        assert!(accumulators.snapshot(id(1)).unwrap().reasoning.is_empty());
        assert_eq!(accumulators.snapshot(id(2)).unwrap().reasoning, "two");
    }
}
