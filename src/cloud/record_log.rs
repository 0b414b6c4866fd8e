//! Append-only line-delimited JSON metrics log.
//!
//! One JSON object per aggregate, stamped with the wall-clock time it was
//! recorded. Write failures are logged and swallowed; they never abort the
//! connection that produced the aggregate.

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::aggregator::AggregateMetrics;

/// One log line: the aggregate plus its recording timestamp.
#[derive(Serialize)]
struct LoggedAggregate<'a> {
    recorded_at: String,
    #[serde(flatten)]
    metrics: &'a AggregateMetrics,
}

/// Append-only metrics log file.
pub struct MetricsLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl MetricsLog {
    /// Open (or create) the log file for appending.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open metrics log: {}", path.display()))?;
        log::info!("Metrics log at {}", path.display());
        Ok(MetricsLog {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Append one aggregate as a JSON line.
    pub fn append(&self, aggregate: &AggregateMetrics) {
        let line = match serde_json::to_string(&LoggedAggregate {
            recorded_at: Utc::now().to_rfc3339(),
            metrics: aggregate,
        }) {
            Ok(line) => line,
            Err(err) => {
                log::error!("Failed to serialize metrics record: {err}");
                return;
            }
        };
        let mut file = self.file.lock().expect("metrics log mutex poisoned");
        if let Err(err) = writeln!(file, "{line}") {
            log::error!("Failed to write metrics log {}: {err}", self.path.display());
        } else {
            log::debug!("Recorded performance metrics: {line}");
        }
    }
}
