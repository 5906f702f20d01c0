// Invariant Tracker: checks the lab's guarantees after every simulated step
// Single flight, TTL countdown, write-through and purge are verified independently

use proxy_lab_engine::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Violations {
    pub single_flight: u32,
    pub ttl_countdown: u32,
    pub write_through: u32,
    pub purge: u32,
    pub inconsistent_entry: u32,
}

impl Violations {
    pub fn total(&self) -> u32 {
        self.single_flight + self.ttl_countdown + self.write_through + self.purge + self.inconsistent_entry
    }
}

pub struct InvariantTracker {
    pub violations: Violations,
    fresh_ttl_secs: u32,
    /// Last remaining TTL seen while the entry was valid.
    last_ttl: Option<u32>,
}

impl InvariantTracker {
    pub fn new(lab: &CacheLab) -> Self {
        let entry = lab.cache_entry();
        Self {
            violations: Violations::default(),
            fresh_ttl_secs: lab.config().fresh_ttl_secs,
            last_ttl: (entry.state == CacheState::Valid).then_some(entry.remaining_ttl_secs),
        }
    }

    /// Re-read the countdown after a scripted event wrote the cache directly.
    pub fn resync(&mut self, lab: &CacheLab) {
        let entry = lab.cache_entry();
        self.last_ttl = (entry.state == CacheState::Valid).then_some(entry.remaining_ttl_secs);
    }

    /// Submit while a run was in flight must be refused and leave that run alone.
    pub fn record_submit(&mut self, active_before: Option<u64>, accepted: bool, lab: &CacheLab) {
        if let Some(id) = active_before {
            let still_same = lab.active_run().map(|r| r.id) == Some(id);
            if accepted || !still_same {
                self.violations.single_flight += 1;
            }
        }
    }

    pub fn record_purge(&mut self, lab: &CacheLab) {
        if lab.cache_entry() != CacheEntry::empty() || lab.pending_ttl_ticks() != 0 {
            self.violations.purge += 1;
        }
        self.last_ttl = None;
    }

    pub fn record_step(&mut self, lab: &CacheLab, step: &StepResult) {
        let mut filled_last = false;
        for event in &step.events {
            match event {
                LabEvent::CacheFilled { ttl_secs, .. } => {
                    if *ttl_secs != self.fresh_ttl_secs {
                        self.violations.write_through += 1;
                    }
                    self.last_ttl = Some(*ttl_secs);
                    filled_last = true;
                }
                LabEvent::TtlTicked { remaining_ttl_secs, .. } => {
                    match self.last_ttl {
                        Some(prev) if prev.checked_sub(1) == Some(*remaining_ttl_secs) => {}
                        _ => self.violations.ttl_countdown += 1,
                    }
                    self.last_ttl = (*remaining_ttl_secs > 0).then_some(*remaining_ttl_secs);
                    filled_last = false;
                }
                _ => {}
            }
        }

        let entry = step.snapshot.cache;
        if !entry.is_consistent() {
            self.violations.inconsistent_entry += 1;
        }
        if filled_last && entry != (CacheEntry { state: CacheState::Valid, remaining_ttl_secs: self.fresh_ttl_secs }) {
            self.violations.write_through += 1;
        }
        if entry.state == CacheState::Valid && lab.pending_ttl_ticks() != 1 {
            self.violations.ttl_countdown += 1;
        }
    }
}
