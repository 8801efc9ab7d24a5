//! Metrics Types
//!
//! Named numeric counters sampled once per tick, and the end-of-run summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters sampled after one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    pub tick: u64,
    pub counters: BTreeMap<String, f64>,
}

impl MetricsSample {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            counters: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.counters.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.counters.get(name).copied()
    }

    /// Serialize as a single JSON line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Summary of a completed (or interrupted) run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub model: String,
    pub seed: u64,
    pub ticks_run: u64,
    pub terminated: bool,
    pub final_counters: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_builder() {
        let sample = MetricsSample::new(5)
            .with("items_remaining", 12.0)
            .with("slow_zone_steps", 3.0);

        assert_eq!(sample.tick, 5);
        assert_eq!(sample.get("items_remaining"), Some(12.0));
        assert_eq!(sample.get("missing"), None);
    }

    #[test]
    fn test_jsonl_is_single_line() {
        let sample = MetricsSample::new(1).with("humans", 15.0);
        let line = sample.to_jsonl().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"humans\":15.0"));
    }
}
