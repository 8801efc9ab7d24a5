//! View Snapshot
//!
//! Everything an external renderer needs to draw one tick.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Portrayal;

/// Generates a view snapshot ID for the given tick.
pub fn generate_view_id(tick: u64) -> String {
    format!("view_{:06}", tick)
}

/// Portrayals for one tick, grouped by draw layer.
///
/// Layers are drawn in ascending order, so environment features sit on
/// low layers and agents on high ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub view_id: String,
    pub tick: u64,
    pub model: String,
    pub layers: BTreeMap<u8, Vec<Portrayal>>,
}

impl ViewSnapshot {
    pub fn new(tick: u64, model: impl Into<String>) -> Self {
        Self {
            view_id: generate_view_id(tick),
            tick,
            model: model.into(),
            layers: BTreeMap::new(),
        }
    }

    /// Add a portrayal to its layer
    pub fn push(&mut self, portrayal: Portrayal) {
        self.layers.entry(portrayal.layer).or_default().push(portrayal);
    }

    /// Total number of portrayals across all layers
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(Vec::is_empty)
    }

    /// Portrayals on a given layer
    pub fn layer(&self, layer: u8) -> &[Portrayal] {
        self.layers.get(&layer).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_id_format() {
        assert_eq!(generate_view_id(42), "view_000042");
    }

    #[test]
    fn test_push_groups_by_layer() {
        let mut snapshot = ViewSnapshot::new(3, "robots");
        assert!(snapshot.is_empty());

        snapshot.push(Portrayal::circle("black", 1, 12.0));
        snapshot.push(Portrayal::circle("olive", 1, 20.0));
        snapshot.push(Portrayal::arrow_head("Red", 3, 0.0));

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.layer(1).len(), 2);
        assert_eq!(snapshot.layer(3).len(), 1);
        assert!(snapshot.layer(2).is_empty());
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut snapshot = ViewSnapshot::new(7, "barn");
        snapshot.push(Portrayal::rect("green", 1, 0.9, 0.9).at(0.5, 0.5));

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("view_000007"));

        let parsed: ViewSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
