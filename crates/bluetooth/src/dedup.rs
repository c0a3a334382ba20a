//! Retransmission suppression.
//!
//! Peers repeat the same advertisement several times so at least one copy
//! reaches the scanner. Each logical event carries a 16-bit token; the
//! history remembers the last `N` tokens and reports repeats.
//!
//! Eviction is FIFO: seeing a remembered token again does not refresh it.
//! Numerically colliding tokens from distinct events are treated as repeats.

/// Default number of remembered tokens.
pub const DEFAULT_CAPACITY: usize = 5;

/// Fixed-capacity ring of recently seen tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupHistory<const N: usize = DEFAULT_CAPACITY> {
    slots: [Option<u16>; N],
    cursor: usize,
}

impl<const N: usize> DedupHistory<N> {
    /// Empty history. Every token is new on first sight, `0` included.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            cursor: 0,
        }
    }

    /// Returns `true` if `token` is remembered. Otherwise records it,
    /// evicting the oldest entry when full, and returns `false`.
    pub fn seen_before(&mut self, token: u16) -> bool {
        if self.contains(token) {
            return true;
        }
        if let Some(slot) = self.slots.get_mut(self.cursor) {
            *slot = Some(token);
        }
        self.cursor = match self.cursor.checked_add(1) {
            Some(next) if next < N => next,
            _ => 0,
        };
        false
    }

    /// `true` if `token` is remembered. Does not record it.
    #[must_use]
    pub fn contains(&self, token: u16) -> bool {
        self.slots.contains(&Some(token))
    }

    /// Number of remembered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// `true` before the first token is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Capacity of the ring.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for DedupHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)] // Tests use expect() and direct indexing for readable assertions
mod tests {
    use super::*;

    #[test]
    fn test_first_sight_is_new_then_duplicate() {
        let mut history = DedupHistory::<5>::new();
        assert!(!history.seen_before(0x1234));
        assert!(history.seen_before(0x1234));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_zero_token_is_new_on_first_sight() {
        let mut history: DedupHistory = DedupHistory::new();
        assert!(history.is_empty());
        assert!(!history.seen_before(0));
        assert!(history.seen_before(0));
    }

    #[test]
    fn test_oldest_token_evicted_first() {
        let mut history = DedupHistory::<5>::new();
        for token in 1..=6 {
            assert!(!history.seen_before(token));
        }
        assert!(!history.contains(1));
        for token in 2..=6 {
            assert!(history.contains(token));
        }
        assert_eq!(history.len(), history.capacity());
    }

    #[test]
    fn test_repeat_does_not_refresh_position() {
        let mut history = DedupHistory::<3>::new();
        assert!(!history.seen_before(10));
        assert!(!history.seen_before(20));
        assert!(history.seen_before(10));
        assert!(!history.seen_before(30));
        assert!(!history.seen_before(40));
        // 10 was oldest despite the repeat, so it went first.
        assert!(!history.contains(10));
        assert!(history.contains(20));
    }
}
