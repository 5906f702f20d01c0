// Per-Step JSONL Event Trace
// One JSON line per simulated step that produced events, for replaying a run offline

use proxy_lab_engine::{CacheEntry, LabEvent, Phase, StepResult};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct StepSnapshot {
    pub now_ms: u64,
    pub cache: CacheEntry,
    pub active_run: Option<u64>,
    pub active_phase: Option<Phase>,
    pub events: Vec<LabEvent>,
}

impl StepSnapshot {
    pub fn from_step(step: &StepResult) -> Self {
        let snapshot = &step.snapshot;
        Self {
            now_ms: snapshot.now_ms,
            cache: snapshot.cache,
            active_run: snapshot.active.as_ref().map(|r| r.id),
            active_phase: snapshot.active.as_ref().map(|r| r.phase),
            events: step.events.clone(),
        }
    }
}

/// Accumulates step snapshots and writes them as JSONL.
pub struct TimeSeriesRecorder {
    snapshots: Vec<StepSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    /// Quiet steps are skipped; the trace only carries state changes.
    pub fn record(&mut self, step: &StepResult) {
        if !step.events.is_empty() {
            self.snapshots.push(StepSnapshot::from_step(step));
        }
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
