//! Process-wide unique key sequence
//!
//! A single `KeySequence` is shared by every worker via `Arc`. It is the
//! only cross-worker mutable state besides the store itself.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing counter producing globally unique key numbers.
///
/// Wait-free: `next_value` is a single `fetch_add`. No two concurrent
/// callers ever observe the same value. Gaps are permitted (a worker may
/// draw a value and then fail before writing it), duplicates are not.
///
/// Overflow is out of scope: a u64 at full tilt gives decades of headroom.
#[derive(Debug)]
pub struct KeySequence {
    counter: AtomicU64,
}

impl KeySequence {
    /// Create a sequence starting at `start` (the first value returned).
    pub fn new(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    /// Draw the next unique value.
    pub fn next_value(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Peek at the next value without consuming it. Racy by nature; only
    /// meaningful when no other thread is drawing.
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_starts_at_seed() {
        let seq = KeySequence::new(100);
        assert_eq!(seq.next_value(), 100);
        assert_eq!(seq.next_value(), 101);
    }

    #[test]
    fn test_sequential_values_are_monotonic() {
        let seq = KeySequence::new(0);
        let mut prev = seq.next_value();
        for _ in 0..1000 {
            let next = seq.next_value();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_concurrent_values_are_distinct() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let seq = Arc::new(KeySequence::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let seq = Arc::clone(&seq);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..PER_THREAD).map(|_| seq.next_value()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for v in h.join().unwrap() {
                assert!(seen.insert(v), "duplicate key value {}", v);
            }
        }
        assert_eq!(seen.len(), THREADS * PER_THREAD);
    }
}
