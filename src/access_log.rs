// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Proxy Lab Simulation Suite - Gateway Access Log

use crate::types::CacheStatus;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One line of the simulated gateway access log, written when a run
/// completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessLogEntry {
    pub run_id: u64,
    pub completed_at_ms: u64,
    pub client_addr: String,
    pub method: String,
    pub uri: String,
    pub status: u16,
    pub body_bytes: u32,
    pub cache_status: CacheStatus,
    pub latency_ms: u32,
}

impl AccessLogEntry {
    /// Combined-style line with the cache status appended, e.g.
    /// `203.0.113.42 - - [+3500ms] "GET /api/data HTTP/1.1" 200 452 MISS 150ms`
    pub fn to_line(&self) -> String {
        format!(
            "{} - - [+{}ms] \"{} {} HTTP/1.1\" {} {} {} {}ms",
            self.client_addr,
            self.completed_at_ms,
            self.method,
            self.uri,
            self.status,
            self.body_bytes,
            self.cache_status.label(),
            self.latency_ms,
        )
    }
}

/// Bounded log; the oldest line is dropped once `capacity` is reached.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessLog {
    entries: VecDeque<AccessLogEntry>,
    capacity: usize,
    total_written: u64,
}

impl AccessLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            total_written: 0,
        }
    }

    pub fn push(&mut self, entry: AccessLogEntry) {
        self.total_written += 1;
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &AccessLogEntry> {
        self.entries.iter()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(AccessLogEntry::to_line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }
}
