use std::sync::atomic::{AtomicU64, Ordering};

/// Generator for opaque, unique message identifiers.
///
/// A random seed is XOR-folded with a monotonic sequence, so ids are unique
/// per process and do not leak the message count.
pub(crate) struct MessageIdGenerator {
    seed: u128,
    counter: AtomicU64,
}

impl MessageIdGenerator {
    #[must_use]
    pub(crate) fn new() -> Self {
        let seed_hi = u128::from(fastrand::u64(..));
        let seed_lo = u128::from(fastrand::u64(..));
        Self {
            seed: (seed_hi << 64) | seed_lo,
            counter: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub(crate) fn next_id(&self) -> uuid::Uuid {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        uuid::Uuid::from_u128(self.seed ^ u128::from(seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let generator = MessageIdGenerator::new();
        let first = generator.next_id();
        let second = generator.next_id();
        let third = generator.next_id();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn test_generators_do_not_collide_on_sequence() {
        let a = MessageIdGenerator::new();
        let b = MessageIdGenerator::new();
        assert_ne!(a.next_id(), b.next_id());
    }
}
