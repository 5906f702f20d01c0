// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Cache State ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CacheState {
    #[default]
    Empty = 0,
    Valid = 1,
    Expired = 2,
}

impl CacheState {
    /// Whether a request arriving now could be served from the gateway.
    pub fn is_servable(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

// ─── Cache Entry ─────────────────────────────────────────────────────────────

/// Read-only view of the single cache slot.
///
/// `remaining_ttl_secs > 0` exactly when `state == Valid`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CacheEntry {
    pub state: CacheState,
    pub remaining_ttl_secs: u32,
}

impl CacheEntry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_consistent(&self) -> bool {
        (self.remaining_ttl_secs > 0) == (self.state == CacheState::Valid)
    }
}

// ─── Request Phase ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle = 0,
    TravelingToGateway = 1,
    FetchingOrigin = 2,
    Returning = 3,
    Done = 4, // terminal
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn is_in_flight(&self) -> bool {
        !matches!(self, Self::Idle | Self::Done)
    }
}

// ─── Path / Cache Status ─────────────────────────────────────────────────────

/// Fast = served from the gateway cache, Slow = fetched from origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Path {
    Fast = 0,
    Slow = 1,
}

/// Value the gateway reports in its cache-status header.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    Hit = 0,
    Miss = 1,
    Expired = 2,
}

impl CacheStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Expired => "EXPIRED",
        }
    }
}

// ─── RequestRun ──────────────────────────────────────────────────────────────

/// One simulated request. `cache_snapshot`, `path` and the outcome are fixed
/// at submit time; the live cache is never consulted again by this run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestRun {
    pub id: u64,
    pub phase: Phase,
    pub path: Path,
    pub cache_snapshot: CacheState,
    /// Revealed when the run reaches the gateway.
    pub result_status: Option<CacheStatus>,
    pub final_status_code: Option<u16>,
    pub latency_ms: u32,
    pub submitted_at_ms: u64,
    #[serde(default)]
    pub completed_at_ms: Option<u64>,
}

// ─── Lab Snapshot ────────────────────────────────────────────────────────────

/// Everything the presentation layer is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabSnapshot {
    pub now_ms: u64,
    pub cache: CacheEntry,
    pub active: Option<RequestRun>,
    pub last_completed: Option<RequestRun>,
}

impl LabSnapshot {
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }
}

// ─── Lab Events ──────────────────────────────────────────────────────────────

/// Observable transitions, in the order they fired during one `advance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LabEvent {
    PhaseChanged { run_id: u64, at_ms: u64, phase: Phase },
    StatusRevealed { run_id: u64, at_ms: u64, status: CacheStatus },
    CacheFilled { run_id: u64, at_ms: u64, ttl_secs: u32 },
    TtlTicked { at_ms: u64, remaining_ttl_secs: u32 },
    CacheExpired { at_ms: u64 },
    RunCompleted { run_id: u64, at_ms: u64, status_code: u16 },
}

// ─── StepResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub snapshot: LabSnapshot,
    pub events: Vec<LabEvent>,
}

// ─── LabStats ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabStats {
    pub submitted: u32,
    pub ignored_submits: u32,
    pub completed: u32,
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
    pub purges: u32,
    pub origin_fetches: u32,
    pub ttl_ticks: u32,
}

impl LabStats {
    pub fn hit_ratio(&self) -> f64 {
        let served = self.hits + self.misses + self.expired;
        if served == 0 {
            0.0
        } else {
            self.hits as f64 / served as f64
        }
    }
}
