//! Run Output
//!
//! Writes views, metric samples and the run summary under one output
//! directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sim_view::{generate_view_id, MetricsSample, RunSummary, ViewSnapshot};

pub const SNAPSHOT_DIR: &str = "snapshots";
pub const METRICS_FILE: &str = "metrics.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Create the output directory and its snapshot folder
pub fn prepare_output_dir(dir: impl AsRef<Path>) -> std::io::Result<()> {
    fs::create_dir_all(dir.as_ref().join(SNAPSHOT_DIR))
}

/// Path of the view file for a tick
pub fn view_path(dir: impl AsRef<Path>, tick: u64) -> PathBuf {
    dir.as_ref()
        .join(SNAPSHOT_DIR)
        .join(format!("{}.json", generate_view_id(tick)))
}

/// Write a view snapshot to `snapshots/view_NNNNNN.json`
pub fn write_view(dir: impl AsRef<Path>, view: &ViewSnapshot) -> std::io::Result<PathBuf> {
    let path = view_path(&dir, view.tick);
    let json = serde_json::to_string_pretty(view)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Write every sample as one JSON line to `metrics.jsonl`
pub fn write_metrics(dir: impl AsRef<Path>, samples: &[MetricsSample]) -> std::io::Result<PathBuf> {
    let path = dir.as_ref().join(METRICS_FILE);
    let mut file = fs::File::create(&path)?;
    for sample in samples {
        writeln!(file, "{}", sample.to_jsonl()?)?;
    }
    Ok(path)
}

pub fn write_summary(dir: impl AsRef<Path>, summary: &RunSummary) -> std::io::Result<PathBuf> {
    let path = dir.as_ref().join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_view::Portrayal;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_view_names_file_by_tick() {
        let dir = tempfile::tempdir().unwrap();
        prepare_output_dir(dir.path()).unwrap();

        let mut view = ViewSnapshot::new(12, "robots");
        view.push(Portrayal::circle("black", 2, 2.0).at(0.5, 0.5));
        let path = write_view(dir.path(), &view).unwrap();

        assert!(path.ends_with("snapshots/view_000012.json"));
        let parsed: ViewSnapshot = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, view);
    }

    #[test]
    fn test_metrics_one_line_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let samples = vec![
            MetricsSample::new(0).with("remaining_cows", 30.0),
            MetricsSample::new(1).with("remaining_cows", 29.0),
        ];
        let path = write_metrics(dir.path(), &samples).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: MetricsSample = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.get("remaining_cows"), Some(29.0));
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = RunSummary {
            model: "village".to_string(),
            seed: 42,
            ticks_run: 10,
            terminated: true,
            final_counters: BTreeMap::from([("humans".to_string(), 14.0)]),
        };
        let path = write_summary(dir.path(), &summary).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"ticks_run\": 10"));
        assert!(text.contains("\"humans\": 14.0"));
    }

    #[test]
    fn test_view_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let view = ViewSnapshot::new(0, "barn");
        assert!(write_view(dir.path().join("absent"), &view).is_err());
    }
}
