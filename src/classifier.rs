// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Outcome Classifier

use crate::config::LatencyProfile;
use crate::types::{CacheState, CacheStatus, Path};
use serde::{Deserialize, Serialize};

/// Path and cache-status label decided for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub path: Path,
    pub status: CacheStatus,
}

impl Outcome {
    /// Simulated latency reported for this outcome.
    pub fn latency_ms(&self, profile: &LatencyProfile) -> u32 {
        match self.path {
            Path::Fast => profile.hit_ms,
            Path::Slow => profile.origin_ms,
        }
    }

    pub fn needs_origin(&self) -> bool {
        self.path == Path::Slow
    }
}

/// Decide how the gateway will serve a request given the cache state observed
/// at submit time. Pure: same input, same output.
pub fn classify(state: CacheState) -> Outcome {
    match state {
        CacheState::Valid => Outcome { path: Path::Fast, status: CacheStatus::Hit },
        CacheState::Empty => Outcome { path: Path::Slow, status: CacheStatus::Miss },
        CacheState::Expired => Outcome { path: Path::Slow, status: CacheStatus::Expired },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping() {
        assert_eq!(classify(CacheState::Valid), Outcome { path: Path::Fast, status: CacheStatus::Hit });
        assert_eq!(classify(CacheState::Empty), Outcome { path: Path::Slow, status: CacheStatus::Miss });
        assert_eq!(
            classify(CacheState::Expired),
            Outcome { path: Path::Slow, status: CacheStatus::Expired }
        );
    }

    #[test]
    fn test_history_independent() {
        let states = [
            CacheState::Valid,
            CacheState::Empty,
            CacheState::Expired,
            CacheState::Valid,
            CacheState::Expired,
            CacheState::Empty,
        ];
        let first: Vec<Outcome> = states.iter().map(|s| classify(*s)).collect();
        let again: Vec<Outcome> = states.iter().rev().map(|s| classify(*s)).collect();
        for (a, b) in first.iter().zip(again.iter().rev()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_latency_labels() {
        let profile = LatencyProfile::default();
        assert_eq!(classify(CacheState::Valid).latency_ms(&profile), 5);
        assert_eq!(classify(CacheState::Empty).latency_ms(&profile), 150);
        assert_eq!(classify(CacheState::Expired).latency_ms(&profile), 150);
        assert!(!classify(CacheState::Valid).needs_origin());
    }
}
