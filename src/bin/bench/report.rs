// Bench Report Types
// Structured JSON output: per-run results, per-scenario aggregates, suite summary

use serde::Serialize;

use crate::metrics::Violations;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub clicks: u32,
    pub purge_clicks: u32,
    pub submitted: u32,
    pub ignored_submits: u32,
    pub completed: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub origin_fetches: u32,
    pub ttl_ticks: u32,
    pub hit_ratio: f64,
    /// Mean displayed latency over completed runs.
    pub avg_latency_ms: f64,
    pub violations: Violations,
    pub simulated_ms: u64,
    pub steps: u64,
    pub elapsed_ms: u128,
    pub steps_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub completed: Stats,
    pub hit_ratio: Stats,
    pub ignored_submits: Stats,
    pub origin_fetches: Stats,
    pub avg_latency_ms: Stats,
    pub violations: Stats,
    pub elapsed_ms: Stats,
    pub steps_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

/// Violation totals across every run of every scenario.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvariantSummary {
    pub single_flight: u32,
    pub ttl_countdown: u32,
    pub write_through: u32,
    pub purge: u32,
    pub inconsistent_entry: u32,
}

impl InvariantSummary {
    pub fn add(&mut self, v: &Violations) {
        self.single_flight += v.single_flight;
        self.ttl_countdown += v.ttl_countdown;
        self.write_through += v.write_through;
        self.purge += v.purge;
        self.inconsistent_entry += v.inconsistent_entry;
    }

    pub fn all_hold(&self) -> bool {
        self.single_flight == 0
            && self.ttl_countdown == 0
            && self.write_through == 0
            && self.purge == 0
            && self.inconsistent_entry == 0
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariants: InvariantSummary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
