// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Request Lifecycle Sequencer

use tracing::{debug, trace};
use wasm_bindgen::prelude::*;

use crate::access_log::{AccessLog, AccessLogEntry};
use crate::cache_store::{CacheStore, TickOutcome};
use crate::classifier::classify;
use crate::config::{ConfigError, LabConfig};
use crate::presentation::Frame;
use crate::scheduler::{Channel, Scheduler, Timer};
use crate::types::*;

const STATUS_OK: u16 = 200;

// ─── CacheLab struct ─────────────────────────────────────────────────────────

/// One mounted cache demo: a gateway with a single cache slot, an origin, and
/// at most one request in flight.
#[wasm_bindgen]
pub struct CacheLab {
    pub(crate) config: LabConfig,
    pub(crate) scheduler: Scheduler,
    pub(crate) cache: CacheStore,

    pub(crate) active: Option<RequestRun>,
    pub(crate) last_completed: Option<RequestRun>,
    pub(crate) run_id_counter: u64,

    pub(crate) access_log: AccessLog,
    pub(crate) stats: LabStats,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl CacheLab {
    /// Mount a lab with a validated configuration.
    pub fn with_config(config: LabConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::mount(config))
    }

    pub(crate) fn mount(config: LabConfig) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.start();
        let access_log = AccessLog::with_capacity(config.access_log_capacity);
        Self {
            config,
            scheduler,
            cache: CacheStore::new(),
            active: None,
            last_completed: None,
            run_id_counter: 0,
            access_log,
            stats: LabStats::default(),
        }
    }

    /// Advance the logical clock by `elapsed_ms`, firing every timer that
    /// falls due, in order.
    pub fn advance_core(&mut self, elapsed_ms: u64) -> StepResult {
        let mut events = Vec::new();
        if self.scheduler.is_running() {
            let target = self.scheduler.now_ms().saturating_add(elapsed_ms);
            while let Some((at_ms, timer)) = self.scheduler.pop_due(target) {
                self.fire(at_ms, timer, &mut events);
            }
            self.scheduler.advance_to(target);
        }
        StepResult { snapshot: self.snapshot(), events }
    }

    /// Fire timers one at a time until the active run (if any) completes.
    /// The clock stops at the completion instant; timers due at that same
    /// instant but queued after the delivery stay pending.
    ///
    /// Terminates: an active run always has its next phase timer queued, and
    /// the TTL chain ends at expiry.
    pub fn run_until_idle(&mut self) -> Vec<LabEvent> {
        let mut events = Vec::new();
        while self.active.is_some() && self.scheduler.is_running() {
            let Some((at_ms, timer)) = self.scheduler.pop_due(u64::MAX) else { break };
            self.fire(at_ms, timer, &mut events);
        }
        events
    }

    /// Setup hook for tests and the bench: store a fresh entry as if an
    /// origin fetch had just completed. Not a user action; the page only
    /// submits and purges.
    #[doc(hidden)]
    pub fn prime_cache(&mut self, ttl_secs: u32) {
        if !self.scheduler.is_running() {
            return;
        }
        self.cache.mark_fresh(ttl_secs);
        self.restart_ttl_chain();
    }

    pub fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            now_ms: self.scheduler.now_ms(),
            cache: self.cache.read(),
            active: self.active.clone(),
            last_completed: self.last_completed.clone(),
        }
    }

    pub fn frame(&self) -> Frame {
        Frame::render(&self.snapshot(), &self.config)
    }

    pub fn cache_entry(&self) -> CacheEntry {
        self.cache.read()
    }

    pub fn active_run(&self) -> Option<&RequestRun> {
        self.active.as_ref()
    }

    pub fn last_completed(&self) -> Option<&RequestRun> {
        self.last_completed.as_ref()
    }

    pub fn stats(&self) -> &LabStats {
        &self.stats
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn is_mounted(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn pending_ttl_ticks(&self) -> usize {
        self.scheduler.pending(Channel::Ttl)
    }

    // ─── Timer callbacks ─────────────────────────────────────────────────────

    fn fire(&mut self, at_ms: u64, timer: Timer, events: &mut Vec<LabEvent>) {
        match timer {
            Timer::ArriveAtGateway { run_id } => self.arrive_at_gateway(run_id, at_ms, events),
            Timer::OriginFetched { run_id } => self.origin_fetched(run_id, at_ms, events),
            Timer::Delivered { run_id } => self.deliver(run_id, at_ms, events),
            Timer::TtlTick => self.ttl_tick(at_ms, events),
        }
    }

    fn arrive_at_gateway(&mut self, run_id: u64, at_ms: u64, events: &mut Vec<LabEvent>) {
        let Some(run) = self.active.as_mut().filter(|r| r.id == run_id) else { return };

        // Branch on the snapshot taken at submit, not the live cache.
        let outcome = classify(run.cache_snapshot);
        run.result_status = Some(outcome.status);
        events.push(LabEvent::StatusRevealed { run_id, at_ms, status: outcome.status });

        match outcome.status {
            CacheStatus::Hit => self.stats.hits += 1,
            CacheStatus::Miss => self.stats.misses += 1,
            CacheStatus::Expired => self.stats.expired += 1,
        }

        let (next_phase, delay, timer) = if outcome.needs_origin() {
            (
                Phase::FetchingOrigin,
                self.config.timings.origin_fetch_ms,
                Timer::OriginFetched { run_id },
            )
        } else {
            (Phase::Returning, self.config.timings.return_ms, Timer::Delivered { run_id })
        };
        run.phase = next_phase;
        self.scheduler.schedule(delay, timer);
        events.push(LabEvent::PhaseChanged { run_id, at_ms, phase: next_phase });
        debug!(run_id, at_ms, status = outcome.status.label(), ?next_phase, "request reached gateway");
    }

    fn origin_fetched(&mut self, run_id: u64, at_ms: u64, events: &mut Vec<LabEvent>) {
        if !self.active.as_ref().is_some_and(|r| r.id == run_id) {
            return;
        }

        if let Some(run) = self.active.as_mut() {
            run.phase = Phase::Returning;
        }
        // Delivery is queued ahead of the restarted countdown, so a tick due
        // at the same instant fires after the run completes.
        self.scheduler.schedule(self.config.timings.return_ms, Timer::Delivered { run_id });

        // Write-through. Happens even if the cache was purged mid-fetch.
        let ttl_secs = self.config.fresh_ttl_secs;
        self.cache.mark_fresh(ttl_secs);
        self.restart_ttl_chain();
        self.stats.origin_fetches += 1;
        events.push(LabEvent::CacheFilled { run_id, at_ms, ttl_secs });
        events.push(LabEvent::PhaseChanged { run_id, at_ms, phase: Phase::Returning });
        debug!(run_id, at_ms, ttl_secs, "origin fetch complete, cache filled");
    }

    fn deliver(&mut self, run_id: u64, at_ms: u64, events: &mut Vec<LabEvent>) {
        if !self.active.as_ref().is_some_and(|r| r.id == run_id) {
            return;
        }
        let Some(mut run) = self.active.take() else { return };

        run.phase = Phase::Done;
        run.final_status_code = Some(STATUS_OK);
        run.completed_at_ms = Some(at_ms);
        self.stats.completed += 1;

        if let Some(status) = run.result_status {
            self.access_log.push(AccessLogEntry {
                run_id,
                completed_at_ms: at_ms,
                client_addr: self.config.client_addr.clone(),
                method: "GET".to_string(),
                uri: self.config.cache_key.clone(),
                status: STATUS_OK,
                body_bytes: self.config.response_bytes,
                cache_status: status,
                latency_ms: run.latency_ms,
            });
        }

        events.push(LabEvent::PhaseChanged { run_id, at_ms, phase: Phase::Done });
        events.push(LabEvent::RunCompleted { run_id, at_ms, status_code: STATUS_OK });
        debug!(run_id, at_ms, latency_ms = run.latency_ms, "request done");
        self.last_completed = Some(run);
    }

    fn ttl_tick(&mut self, at_ms: u64, events: &mut Vec<LabEvent>) {
        match self.cache.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Counting(remaining) => {
                self.stats.ttl_ticks += 1;
                self.scheduler.schedule(self.config.tick_interval_ms, Timer::TtlTick);
                events.push(LabEvent::TtlTicked { at_ms, remaining_ttl_secs: remaining });
                trace!(at_ms, remaining, "ttl tick");
            }
            TickOutcome::Expired => {
                self.stats.ttl_ticks += 1;
                events.push(LabEvent::TtlTicked { at_ms, remaining_ttl_secs: 0 });
                events.push(LabEvent::CacheExpired { at_ms });
                debug!(at_ms, "cache entry expired");
            }
        }
    }

    /// Replace any pending countdown with a fresh one, if the entry is valid.
    pub(crate) fn restart_ttl_chain(&mut self) {
        self.scheduler.cancel_channel(Channel::Ttl);
        if self.cache.state() == CacheState::Valid {
            self.scheduler.schedule(self.config.tick_interval_ms, Timer::TtlTick);
        }
    }
}
