// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Cache Demo Engine

pub mod types;
pub mod config;
pub mod scheduler;
pub mod cache_store;
pub mod classifier;
pub mod access_log;
pub mod simulation;
pub mod presentation;

pub use types::*;
pub use config::{ConfigError, LabConfig, LatencyProfile, PhaseTimings};
pub use classifier::{classify, Outcome};
pub use presentation::Frame;
pub use simulation::CacheLab;

use scheduler::{Channel, Timer};
use tracing::{debug, trace};
use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl CacheLab {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        CacheLab::mount(LabConfig::default())
    }

    /// Mount with a partial options object; missing fields use defaults.
    pub fn with_options(options: JsValue) -> Result<CacheLab, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config: LabConfig = serde_wasm_bindgen::from_value(options)
            .map_err(|e| ConfigError::Decode(e.to_string()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        CacheLab::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start a request. Ignored (returns false) while another is in flight.
    pub fn submit_request(&mut self) -> bool {
        if !self.scheduler.is_running() {
            return false;
        }
        if self.active.is_some() {
            self.stats.ignored_submits += 1;
            trace!(now_ms = self.scheduler.now_ms(), "submit ignored, request in flight");
            return false;
        }

        let cache_snapshot = self.cache.state();
        let outcome = classify(cache_snapshot);
        let run_id = self.run_id_counter;
        self.run_id_counter += 1;

        let run = RequestRun {
            id: run_id,
            phase: Phase::TravelingToGateway,
            path: outcome.path,
            cache_snapshot,
            result_status: None,
            final_status_code: None,
            latency_ms: outcome.latency_ms(&self.config.latency),
            submitted_at_ms: self.scheduler.now_ms(),
            completed_at_ms: None,
        };
        self.scheduler
            .schedule(self.config.timings.travel_ms, Timer::ArriveAtGateway { run_id });
        self.active = Some(run);
        self.stats.submitted += 1;

        debug!(run_id, ?cache_snapshot, path = ?outcome.path, "request submitted");
        true
    }

    /// Empty the cache and stop the TTL countdown. An in-flight request keeps
    /// running and may refill the cache.
    pub fn purge_cache(&mut self) {
        if !self.scheduler.is_running() {
            return;
        }
        self.cache.mark_empty();
        let cancelled = self.scheduler.cancel_channel(Channel::Ttl);
        self.stats.purges += 1;
        debug!(now_ms = self.scheduler.now_ms(), cancelled, "cache purged");
    }

    pub fn advance(&mut self, elapsed_ms: u32) -> JsValue {
        let result = self.advance_core(elapsed_ms as u64);
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn get_snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshot()).unwrap_or(JsValue::NULL)
    }

    pub fn get_frame(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.frame()).unwrap_or(JsValue::NULL)
    }

    pub fn get_access_log(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.access_log.lines()).unwrap_or(JsValue::NULL)
    }

    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats).unwrap_or(JsValue::NULL)
    }

    /// Milliseconds until the next scheduled transition, if any. Lets the page
    /// sleep instead of polling.
    pub fn next_event_in_ms(&self) -> Option<u32> {
        let now = self.scheduler.now_ms();
        self.scheduler
            .next_due_ms()
            .map(|due| u32::try_from(due.saturating_sub(now)).unwrap_or(u32::MAX))
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Tear down: cancel every timer and drop all state. Further calls are
    /// no-ops until `reset`.
    pub fn unmount(&mut self) {
        self.scheduler.stop();
        self.active = None;
        self.cache.mark_empty();
        debug!("lab unmounted");
    }

    /// Reset lab to its freshly mounted state
    pub fn reset(&mut self) {
        *self = CacheLab::mount(self.config.clone());
    }
}

impl Default for CacheLab {
    fn default() -> Self {
        Self::new()
    }
}
