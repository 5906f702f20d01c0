// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Logical Clock & Timer Queue

//! Deterministic timer queue on a millisecond logical clock.
//!
//! Timers are ordered by:
//! 1. Due time (earlier first)
//! 2. Sequence number (FIFO among timers due at the same instant)
//!
//! The request phase chain and the TTL countdown live on separate
//! [`Channel`]s so one can be cancelled without touching the other.

use std::collections::BTreeMap;

/// Independent timelines sharing the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Request,
    Ttl,
}

/// Callback scheduled on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    ArriveAtGateway { run_id: u64 },
    OriginFetched { run_id: u64 },
    Delivered { run_id: u64 },
    TtlTick,
}

impl Timer {
    pub fn channel(&self) -> Channel {
        match self {
            Self::TtlTick => Channel::Ttl,
            _ => Channel::Request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerKey {
    pub due_ms: u64,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub timers_set: u64,
    pub timers_fired: u64,
    pub timers_cancelled: u64,
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    sequence: u64,
    queue: BTreeMap<TimerKey, Timer>,
    running: bool,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Drop every pending timer and refuse new ones until `start` is called.
    pub fn stop(&mut self) {
        self.cancel_all();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Schedule `timer` to fire `delay_ms` from now. Returns `None` when the
    /// scheduler is stopped.
    pub fn schedule(&mut self, delay_ms: u64, timer: Timer) -> Option<TimerKey> {
        if !self.running {
            return None;
        }
        let key = TimerKey {
            due_ms: self.now_ms.saturating_add(delay_ms),
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.queue.insert(key, timer);
        self.stats.timers_set += 1;
        Some(key)
    }

    /// Cancel every pending timer on `channel`. Returns how many were removed.
    pub fn cancel_channel(&mut self, channel: Channel) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, t| t.channel() != channel);
        let removed = before - self.queue.len();
        self.stats.timers_cancelled += removed as u64;
        removed
    }

    pub fn cancel_all(&mut self) -> usize {
        let removed = self.queue.len();
        self.queue.clear();
        self.stats.timers_cancelled += removed as u64;
        removed
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(u64, Timer)> {
        let (&key, _) = self.queue.iter().next()?;
        if key.due_ms > until_ms {
            return None;
        }
        let timer = self.queue.remove(&key)?;
        self.now_ms = self.now_ms.max(key.due_ms);
        self.stats.timers_fired += 1;
        Some((key.due_ms, timer))
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.keys().next().map(|k| k.due_ms)
    }

    pub fn pending(&self, channel: Channel) -> usize {
        self.queue.values().filter(|t| t.channel() == channel).count()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Scheduler {
        let mut s = Scheduler::new();
        s.start();
        s
    }

    #[test]
    fn test_time_ordering() {
        let mut s = started();
        s.schedule(1500, Timer::OriginFetched { run_id: 1 });
        s.schedule(1000, Timer::ArriveAtGateway { run_id: 1 });
        assert_eq!(s.pop_due(5000), Some((1000, Timer::ArriveAtGateway { run_id: 1 })));
        assert_eq!(s.now_ms(), 1000);
        assert_eq!(s.pop_due(5000), Some((1500, Timer::OriginFetched { run_id: 1 })));
        assert_eq!(s.pop_due(5000), None);
    }

    #[test]
    fn test_fifo_at_same_instant() {
        let mut s = started();
        s.schedule(1000, Timer::TtlTick);
        s.schedule(1000, Timer::Delivered { run_id: 4 });
        assert_eq!(s.pop_due(1000).map(|(_, t)| t), Some(Timer::TtlTick));
        assert_eq!(s.pop_due(1000).map(|(_, t)| t), Some(Timer::Delivered { run_id: 4 }));
    }

    #[test]
    fn test_not_due_yet() {
        let mut s = started();
        s.schedule(1000, Timer::TtlTick);
        assert_eq!(s.pop_due(999), None);
        assert_eq!(s.now_ms(), 0);
        assert_eq!(s.next_due_ms(), Some(1000));
    }

    #[test]
    fn test_cancel_channel_leaves_other_channel() {
        let mut s = started();
        s.schedule(1000, Timer::TtlTick);
        s.schedule(1500, Timer::OriginFetched { run_id: 2 });
        assert_eq!(s.cancel_channel(Channel::Ttl), 1);
        assert_eq!(s.pending(Channel::Ttl), 0);
        assert_eq!(s.pending(Channel::Request), 1);
        assert_eq!(s.stats().timers_cancelled, 1);
    }

    #[test]
    fn test_stopped_scheduler_rejects_timers() {
        let mut s = Scheduler::new();
        assert_eq!(s.schedule(10, Timer::TtlTick), None);
        s.start();
        s.schedule(10, Timer::TtlTick);
        s.stop();
        assert!(s.is_empty());
        assert!(!s.is_running());
        assert_eq!(s.schedule(10, Timer::TtlTick), None);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut s = started();
        s.advance_to(500);
        s.advance_to(200);
        assert_eq!(s.now_ms(), 500);
        let key = s.schedule(100, Timer::TtlTick).unwrap();
        assert_eq!(key.due_ms, 600);
    }
}
