// Scenario Definitions: scripted lifecycle walkthroughs + random visitor workloads
// Zero engine changes: scripted actions live in mid_event closures, checks in final_check

use proxy_lab_engine::*;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub duration_ms: u64,
    pub step_ms: u64,
    pub clicks_per_sec: f64,
    pub purges_per_sec: f64,
    /// Lab configuration; `None` uses the reference timings.
    pub config: Option<fn() -> LabConfig>,
    pub criteria: PassCriteria,
    /// Scripted actions, called at the start of every step with the clock time.
    pub mid_event: Option<Box<dyn Fn(&mut CacheLab, u64) + Send + Sync>>,
    /// Post-run assertion on the final lab state.
    pub final_check: Option<Box<dyn Fn(&CacheLab) -> bool + Send + Sync>>,
}

pub struct PassCriteria {
    pub require_zero_violations: bool,
    pub min_completed: Option<u32>,
    pub min_hit_ratio: Option<f64>,
    pub max_hit_ratio: Option<f64>,
    pub min_expired: Option<u32>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_zero_violations: true,
            min_completed: None,
            min_hit_ratio: None,
            max_hit_ratio: None,
            min_expired: None,
        }
    }
}

// ─── Config Variants ────────────────────────────────────────────────────────

fn short_ttl_config() -> LabConfig {
    LabConfig { fresh_ttl_secs: 2, ..Default::default() }
}

fn fast_animation_config() -> LabConfig {
    LabConfig {
        timings: PhaseTimings { travel_ms: 200, origin_fetch_ms: 300, return_ms: 200 },
        tick_interval_ms: 200,
        ..Default::default()
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn last_status(lab: &CacheLab) -> Option<CacheStatus> {
    lab.last_completed().and_then(|r| r.result_status)
}

fn finished_ok(lab: &CacheLab) -> bool {
    lab.active_run().is_none()
        && lab.last_completed().is_some_and(|r| r.phase == Phase::Done && r.final_status_code == Some(200))
}

fn scripted(
    name: &'static str,
    label: &'static str,
    duration_ms: u64,
    mid_event: impl Fn(&mut CacheLab, u64) + Send + Sync + 'static,
    final_check: impl Fn(&CacheLab) -> bool + Send + Sync + 'static,
) -> Scenario {
    Scenario {
        name,
        label,
        category: "scripted",
        duration_ms,
        step_ms: 100,
        clicks_per_sec: 0.0,
        purges_per_sec: 0.0,
        config: None,
        criteria: PassCriteria::default(),
        mid_event: Some(Box::new(mid_event)),
        final_check: Some(Box::new(final_check)),
    }
}

// ─── Scenario Definitions ───────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // ─── Scripted Walkthroughs (6) ──────────────────────────────────
        scripted("SCRIPT_COLD_MISS", "Cold Miss", 3500,
            |lab, t| if t == 0 { lab.submit_request(); },
            |lab| finished_ok(lab)
                && last_status(lab) == Some(CacheStatus::Miss)
                && lab.cache_entry().state == CacheState::Valid),
        scripted("SCRIPT_WARM_HIT", "Warm Hit", 2000,
            |lab, t| if t == 0 { lab.prime_cache(5); lab.submit_request(); },
            |lab| finished_ok(lab)
                && last_status(lab) == Some(CacheStatus::Hit)
                && lab.stats().origin_fetches == 0
                && lab.cache_entry() == CacheEntry { state: CacheState::Valid, remaining_ttl_secs: 3 }),
        scripted("SCRIPT_SILENT_EXPIRY", "Silent Expiry", 1000,
            |lab, t| if t == 0 { lab.prime_cache(1); },
            |lab| lab.cache_entry() == CacheEntry { state: CacheState::Expired, remaining_ttl_secs: 0 }),
        scripted("SCRIPT_EXPIRED_REFETCH", "Expired Refetch", 4500,
            |lab, t| match t {
                0 => lab.prime_cache(1),
                1000 => { lab.submit_request(); }
                _ => {}
            },
            |lab| finished_ok(lab)
                && last_status(lab) == Some(CacheStatus::Expired)
                && lab.cache_entry().state == CacheState::Valid),
        scripted("SCRIPT_PURGE_COUNTDOWN", "Purge Stops Countdown", 5000,
            |lab, t| if t == 0 { lab.prime_cache(3); lab.purge_cache(); },
            |lab| lab.cache_entry() == CacheEntry::empty() && lab.stats().ttl_ticks == 0),
        scripted("SCRIPT_PURGE_DURING_FETCH", "Purge During Fetch", 3500,
            |lab, t| match t {
                0 => { lab.submit_request(); }
                1500 => lab.purge_cache(),
                _ => {}
            },
            |lab| finished_ok(lab)
                && lab.stats().purges == 1
                && lab.cache_entry().state == CacheState::Valid),

        // ─── Visitor Workloads (5) ──────────────────────────────────────
        Scenario { name: "WORKLOAD_STEADY", label: "Steady Browsing", category: "workload",
            duration_ms: 120_000, step_ms: 100, clicks_per_sec: 0.3, purges_per_sec: 0.0,
            config: None,
            criteria: PassCriteria { min_completed: Some(10), min_hit_ratio: Some(0.4), ..Default::default() },
            mid_event: None, final_check: None },
        Scenario { name: "WORKLOAD_IMPATIENT", label: "Impatient Clicker", category: "workload",
            duration_ms: 60_000, step_ms: 100, clicks_per_sec: 4.0, purges_per_sec: 0.0,
            config: None,
            criteria: PassCriteria { min_completed: Some(10), ..Default::default() },
            mid_event: None,
            final_check: Some(Box::new(|lab| lab.stats().ignored_submits > lab.stats().submitted)) },
        Scenario { name: "WORKLOAD_PURGE_HAPPY", label: "Purge Happy", category: "workload",
            duration_ms: 120_000, step_ms: 100, clicks_per_sec: 0.5, purges_per_sec: 0.3,
            config: None,
            criteria: PassCriteria { min_completed: Some(10), max_hit_ratio: Some(0.9), ..Default::default() },
            mid_event: None, final_check: None },
        Scenario { name: "WORKLOAD_SHORT_TTL", label: "Short TTL", category: "workload",
            duration_ms: 120_000, step_ms: 100, clicks_per_sec: 0.25, purges_per_sec: 0.0,
            config: Some(short_ttl_config),
            criteria: PassCriteria { min_completed: Some(10), min_expired: Some(1), ..Default::default() },
            mid_event: None, final_check: None },
        Scenario { name: "WORKLOAD_FAST_ANIMATION", label: "Fast Animation", category: "workload",
            duration_ms: 30_000, step_ms: 50, clicks_per_sec: 2.0, purges_per_sec: 0.1,
            config: Some(fast_animation_config),
            criteria: PassCriteria { min_completed: Some(10), ..Default::default() },
            mid_event: None, final_check: None },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_counts() {
        let all = scenarios();
        assert_eq!(all.iter().filter(|s| s.category == "scripted").count(), 6);
        assert_eq!(all.iter().filter(|s| s.category == "workload").count(), 5);
    }

    #[test]
    fn test_names_are_unique() {
        let all = scenarios();
        let mut names: Vec<_> = all.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }
}
