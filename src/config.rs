// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Lab Configuration

//! Timings and display constants for one lab instance.
//!
//! `LabConfig::default()` reproduces the reference demo: 1000 ms to reach the
//! gateway, 1500 ms at the origin, 1000 ms back, a 10 second freshness window
//! counted down once per second.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("phase `{0}` must last at least 1 ms")]
    ZeroPhase(&'static str),
    #[error("ttl tick interval must be at least 1 ms")]
    ZeroTickInterval,
    #[error("freshness window must be at least 1 second")]
    ZeroFreshness,
    #[error("invalid lab options: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// PhaseTimings
// ---------------------------------------------------------------------------

/// Fixed per-phase durations of a request run, in simulated milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PhaseTimings {
    pub travel_ms: u64,
    pub origin_fetch_ms: u64,
    pub return_ms: u64,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self {
            travel_ms: 1000,
            origin_fetch_ms: 1500,
            return_ms: 1000,
        }
    }
}

impl PhaseTimings {
    /// Submit-to-done duration on the fast path.
    pub fn fast_total_ms(&self) -> u64 {
        self.travel_ms + self.return_ms
    }

    /// Submit-to-done duration on the slow path.
    pub fn slow_total_ms(&self) -> u64 {
        self.travel_ms + self.origin_fetch_ms + self.return_ms
    }
}

// ---------------------------------------------------------------------------
// LatencyProfile
// ---------------------------------------------------------------------------

/// Latency figures shown to the user. These are labels, not the animation
/// timings above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LatencyProfile {
    pub hit_ms: u32,
    pub origin_ms: u32,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self { hit_ms: 5, origin_ms: 150 }
    }
}

// ---------------------------------------------------------------------------
// LabConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    pub timings: PhaseTimings,
    pub tick_interval_ms: u64,
    pub fresh_ttl_secs: u32,
    pub latency: LatencyProfile,
    pub cache_key: String,
    pub client_addr: String,
    pub response_bytes: u32,
    pub access_log_capacity: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            tick_interval_ms: 1000,
            fresh_ttl_secs: 10,
            latency: LatencyProfile::default(),
            cache_key: "/api/data".to_string(),
            client_addr: "203.0.113.42".to_string(),
            response_bytes: 452,
            access_log_capacity: 50,
        }
    }
}

impl LabConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timings.travel_ms == 0 {
            return Err(ConfigError::ZeroPhase("travel"));
        }
        if self.timings.origin_fetch_ms == 0 {
            return Err(ConfigError::ZeroPhase("origin_fetch"));
        }
        if self.timings.return_ms == 0 {
            return Err(ConfigError::ZeroPhase("return"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.fresh_ttl_secs == 0 {
            return Err(ConfigError::ZeroFreshness);
        }
        Ok(())
    }

    /// Parse and validate a JSON options document. Missing fields fall back
    /// to the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LabConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Decode(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_timings() {
        let c = LabConfig::default();
        assert_eq!(c.timings.travel_ms, 1000);
        assert_eq!(c.timings.origin_fetch_ms, 1500);
        assert_eq!(c.timings.return_ms, 1000);
        assert_eq!(c.tick_interval_ms, 1000);
        assert_eq!(c.fresh_ttl_secs, 10);
        assert_eq!(c.timings.fast_total_ms(), 2000);
        assert_eq!(c.timings.slow_total_ms(), 3500);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_zero_phase_rejected() {
        let mut c = LabConfig::default();
        c.timings.origin_fetch_ms = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroPhase("origin_fetch")));
    }

    #[test]
    fn test_zero_tick_and_freshness_rejected() {
        let mut c = LabConfig::default();
        c.tick_interval_ms = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroTickInterval));

        let mut c = LabConfig::default();
        c.fresh_ttl_secs = 0;
        assert_eq!(c.validate(), Err(ConfigError::ZeroFreshness));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c = LabConfig::from_json(r#"{ "fresh_ttl_secs": 3, "timings": { "travel_ms": 200 } }"#)
            .unwrap();
        assert_eq!(c.fresh_ttl_secs, 3);
        assert_eq!(c.timings.travel_ms, 200);
        assert_eq!(c.timings.origin_fetch_ms, 1500);
        assert_eq!(c.cache_key, "/api/data");
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = LabConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Decode(_)));
    }

    #[test]
    fn test_json_validation_runs() {
        let err = LabConfig::from_json(r#"{ "tick_interval_ms": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::ZeroTickInterval);
    }
}
