// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Cache State Store

use crate::types::{CacheEntry, CacheState};

/// Result of a single TTL tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Entry was not valid; nothing changed.
    Idle,
    /// Still valid with this many seconds left.
    Counting(u32),
    /// This tick zeroed the TTL.
    Expired,
}

// ---------------------------------------------------------------------------
// CacheStore
// ---------------------------------------------------------------------------

/// Holds the single cache slot of a lab. Only the sequencer writes to it.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entry: CacheEntry,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> CacheEntry {
        self.entry
    }

    pub fn state(&self) -> CacheState {
        self.entry.state
    }

    /// Store a fresh response. A zero TTL leaves the entry already expired.
    pub fn mark_fresh(&mut self, ttl_secs: u32) {
        self.entry = if ttl_secs == 0 {
            CacheEntry { state: CacheState::Expired, remaining_ttl_secs: 0 }
        } else {
            CacheEntry { state: CacheState::Valid, remaining_ttl_secs: ttl_secs }
        };
    }

    pub fn mark_empty(&mut self) {
        self.entry = CacheEntry::empty();
    }

    /// Count down one second. Reaching zero and expiring happen together.
    pub fn tick(&mut self) -> TickOutcome {
        if self.entry.state != CacheState::Valid {
            return TickOutcome::Idle;
        }
        let remaining = self.entry.remaining_ttl_secs.saturating_sub(1);
        if remaining == 0 {
            self.entry = CacheEntry { state: CacheState::Expired, remaining_ttl_secs: 0 };
            TickOutcome::Expired
        } else {
            self.entry.remaining_ttl_secs = remaining;
            TickOutcome::Counting(remaining)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let store = CacheStore::new();
        assert_eq!(store.read(), CacheEntry { state: CacheState::Empty, remaining_ttl_secs: 0 });
    }

    #[test]
    fn test_ticks_down_by_one() {
        let mut store = CacheStore::new();
        store.mark_fresh(3);
        assert_eq!(store.tick(), TickOutcome::Counting(2));
        assert_eq!(store.tick(), TickOutcome::Counting(1));
        assert_eq!(store.read().state, CacheState::Valid);
        assert_eq!(store.tick(), TickOutcome::Expired);
        assert_eq!(store.read(), CacheEntry { state: CacheState::Expired, remaining_ttl_secs: 0 });
    }

    #[test]
    fn test_tick_is_guarded_when_not_valid() {
        let mut store = CacheStore::new();
        assert_eq!(store.tick(), TickOutcome::Idle);
        assert_eq!(store.read(), CacheEntry::empty());

        store.mark_fresh(1);
        store.tick();
        assert_eq!(store.tick(), TickOutcome::Idle);
        assert_eq!(store.read().state, CacheState::Expired);
    }

    #[test]
    fn test_mark_empty_is_idempotent() {
        let mut store = CacheStore::new();
        store.mark_empty();
        assert_eq!(store.read(), CacheEntry::empty());
        store.mark_fresh(7);
        store.mark_empty();
        store.mark_empty();
        assert_eq!(store.read(), CacheEntry::empty());
    }

    #[test]
    fn test_refresh_resets_ttl() {
        let mut store = CacheStore::new();
        store.mark_fresh(10);
        store.tick();
        store.tick();
        store.mark_fresh(10);
        assert_eq!(store.read().remaining_ttl_secs, 10);
    }

    #[test]
    fn test_zero_ttl_keeps_invariant() {
        let mut store = CacheStore::new();
        store.mark_fresh(0);
        assert!(store.read().is_consistent());
        assert_eq!(store.state(), CacheState::Expired);
    }

    #[test]
    fn test_invariant_holds_through_countdown() {
        let mut store = CacheStore::new();
        store.mark_fresh(10);
        for _ in 0..15 {
            store.tick();
            assert!(store.read().is_consistent());
        }
    }
}
