// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Presentation Adapter

//! Turns a [`LabSnapshot`] into what the page draws.
//!
//! Read-only: a frame is derived from a snapshot and never feeds anything
//! back into the lab. Positions are percentages of the client→origin track
//! (client at 10 %, gateway at 50 %, origin at 90 %).

use crate::config::LabConfig;
use crate::types::{CacheState, CacheStatus, LabSnapshot, Path, Phase, RequestRun};
use serde::Serialize;

const CLIENT_POS: f64 = 10.0;
const GATEWAY_POS: f64 = 50.0;
const ORIGIN_POS: f64 = 90.0;

const OUTBOUND_COLOR: &str = "#3b82f6";
const RESPONSE_COLOR: &str = "#22c55e";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Success,
    Danger,
    Warning,
}

/// A dot moving along one link, with the CSS transition to reach its target.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Particle {
    pub position_pct: f64,
    pub color: &'static str,
    pub transition_ms: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CachePanel {
    pub key: String,
    pub label: &'static str,
    pub ttl_text: Option<String>,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusHeader {
    pub label: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SendButton {
    pub enabled: bool,
    pub caption: &'static str,
}

// ─── Frame ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Frame {
    pub now_ms: u64,
    pub client_link: Option<Particle>,
    pub origin_link: Option<Particle>,
    pub cache: CachePanel,
    pub status: StatusHeader,
    pub latency_text: String,
    pub button: SendButton,
}

impl Frame {
    pub fn render(snapshot: &LabSnapshot, config: &LabConfig) -> Self {
        let active = snapshot.active.as_ref();
        Self {
            now_ms: snapshot.now_ms,
            client_link: active.map(|run| client_particle(run, config)),
            origin_link: active.and_then(|run| origin_particle(run, config)),
            cache: cache_panel(snapshot, config),
            status: status_header(snapshot),
            latency_text: latency_text(snapshot),
            button: if active.is_some() {
                SendButton { enabled: false, caption: "Processing..." }
            } else {
                SendButton { enabled: true, caption: "Send Request" }
            },
        }
    }
}

/// The client dot parks at the gateway while the origin fetch runs instead
/// of snapping back to the client the moment it arrives; it only heads home
/// once the response is returning. See DESIGN.md for this deviation.
fn client_particle(run: &RequestRun, config: &LabConfig) -> Particle {
    let position_pct = match run.phase {
        Phase::TravelingToGateway | Phase::FetchingOrigin => GATEWAY_POS,
        _ => CLIENT_POS,
    };
    let color = if run.phase == Phase::Returning && run.path == Path::Fast {
        RESPONSE_COLOR
    } else {
        OUTBOUND_COLOR
    };
    let transition_ms = match run.phase {
        Phase::Returning => config.timings.return_ms,
        _ => config.timings.travel_ms,
    };
    Particle { position_pct, color, transition_ms }
}

fn origin_particle(run: &RequestRun, config: &LabConfig) -> Option<Particle> {
    match (run.phase, run.path) {
        (Phase::FetchingOrigin, _) => Some(Particle {
            position_pct: ORIGIN_POS,
            color: OUTBOUND_COLOR,
            transition_ms: config.timings.origin_fetch_ms,
        }),
        (Phase::Returning, Path::Slow) => Some(Particle {
            position_pct: GATEWAY_POS,
            color: RESPONSE_COLOR,
            transition_ms: config.timings.origin_fetch_ms,
        }),
        _ => None,
    }
}

fn cache_panel(snapshot: &LabSnapshot, config: &LabConfig) -> CachePanel {
    let entry = snapshot.cache;
    let (label, tone) = match entry.state {
        CacheState::Empty => ("Empty", Tone::Neutral),
        CacheState::Valid => ("Cached", Tone::Success),
        CacheState::Expired => ("Expired", Tone::Danger),
    };
    let ttl_text = match entry.state {
        CacheState::Empty => None,
        _ => Some(format!("{}s", entry.remaining_ttl_secs)),
    };
    CachePanel { key: config.cache_key.clone(), label, ttl_text, tone }
}

/// Label of the run being shown: the active one, or the last completed one
/// when idle.
fn shown_status(snapshot: &LabSnapshot) -> Option<CacheStatus> {
    match &snapshot.active {
        Some(run) => run.result_status,
        None => snapshot.last_completed.as_ref().and_then(|r| r.result_status),
    }
}

fn status_header(snapshot: &LabSnapshot) -> StatusHeader {
    match shown_status(snapshot) {
        None => StatusHeader { label: "-", tone: Tone::Neutral },
        Some(status) => StatusHeader {
            label: status.label(),
            tone: match status {
                CacheStatus::Hit => Tone::Success,
                CacheStatus::Miss => Tone::Danger,
                CacheStatus::Expired => Tone::Warning,
            },
        },
    }
}

fn latency_text(snapshot: &LabSnapshot) -> String {
    if snapshot.active.is_some() {
        return "-".to_string();
    }
    match &snapshot.last_completed {
        Some(run) if run.final_status_code.is_some() => format!("{}ms", run.latency_ms),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CacheEntry;

    fn run(phase: Phase, path: Path, status: Option<CacheStatus>) -> RequestRun {
        RequestRun {
            id: 0,
            phase,
            path,
            cache_snapshot: CacheState::Empty,
            result_status: status,
            final_status_code: None,
            latency_ms: 150,
            submitted_at_ms: 0,
            completed_at_ms: None,
        }
    }

    fn snapshot(active: Option<RequestRun>, last: Option<RequestRun>) -> LabSnapshot {
        LabSnapshot { now_ms: 0, cache: CacheEntry::empty(), active, last_completed: last }
    }

    #[test]
    fn test_idle_frame() {
        let f = Frame::render(&snapshot(None, None), &LabConfig::default());
        assert!(f.client_link.is_none());
        assert!(f.origin_link.is_none());
        assert_eq!(f.status.label, "-");
        assert_eq!(f.latency_text, "-");
        assert!(f.button.enabled);
        assert_eq!(f.cache.label, "Empty");
        assert_eq!(f.cache.ttl_text, None);
        assert_eq!(f.cache.key, "/api/data");
    }

    #[test]
    fn test_traveling_particle_heads_to_gateway() {
        let s = snapshot(Some(run(Phase::TravelingToGateway, Path::Slow, None)), None);
        let f = Frame::render(&s, &LabConfig::default());
        let p = f.client_link.unwrap();
        assert_eq!(p.position_pct, GATEWAY_POS);
        assert_eq!(p.color, OUTBOUND_COLOR);
        assert!(f.origin_link.is_none());
        assert!(!f.button.enabled);
        assert_eq!(f.button.caption, "Processing...");
    }

    #[test]
    fn test_fetching_shows_origin_particle() {
        let s = snapshot(
            Some(run(Phase::FetchingOrigin, Path::Slow, Some(CacheStatus::Miss))),
            None,
        );
        let f = Frame::render(&s, &LabConfig::default());
        let p = f.origin_link.unwrap();
        assert_eq!(p.position_pct, ORIGIN_POS);
        assert_eq!(p.transition_ms, 1500);
        assert_eq!(f.client_link.unwrap().position_pct, GATEWAY_POS);
        assert_eq!(f.status.label, "MISS");
        assert_eq!(f.status.tone, Tone::Danger);
    }

    #[test]
    fn test_fast_return_is_green_and_skips_origin() {
        let s = snapshot(Some(run(Phase::Returning, Path::Fast, Some(CacheStatus::Hit))), None);
        let f = Frame::render(&s, &LabConfig::default());
        let p = f.client_link.unwrap();
        assert_eq!(p.position_pct, CLIENT_POS);
        assert_eq!(p.color, RESPONSE_COLOR);
        assert!(f.origin_link.is_none());
    }

    #[test]
    fn test_new_run_hides_previous_label_and_latency() {
        let mut done = run(Phase::Done, Path::Fast, Some(CacheStatus::Hit));
        done.final_status_code = Some(200);
        done.latency_ms = 5;
        let s = snapshot(Some(run(Phase::TravelingToGateway, Path::Fast, None)), Some(done.clone()));
        let f = Frame::render(&s, &LabConfig::default());
        assert_eq!(f.status.label, "-");
        assert_eq!(f.latency_text, "-");

        let idle = Frame::render(&snapshot(None, Some(done)), &LabConfig::default());
        assert_eq!(idle.status.label, "HIT");
        assert_eq!(idle.latency_text, "5ms");
    }

    #[test]
    fn test_cache_panel_ttl_text() {
        let mut s = snapshot(None, None);
        s.cache = CacheEntry { state: CacheState::Valid, remaining_ttl_secs: 7 };
        let f = Frame::render(&s, &LabConfig::default());
        assert_eq!(f.cache.label, "Cached");
        assert_eq!(f.cache.ttl_text.as_deref(), Some("7s"));

        s.cache = CacheEntry { state: CacheState::Expired, remaining_ttl_secs: 0 };
        let f = Frame::render(&s, &LabConfig::default());
        assert_eq!(f.cache.label, "Expired");
        assert_eq!(f.cache.ttl_text.as_deref(), Some("0s"));
        assert_eq!(f.cache.tone, Tone::Danger);
    }
}
