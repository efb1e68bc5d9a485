//! Final run report
//!
//! Aggregated counters plus derived throughput, printable for humans and
//! serializable for machine consumption.

use std::fmt;
use std::time::Duration;

use batchbench_core::WorkerStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregated result of one load-generation run.
///
/// `ops_done` counts attempted operations (the loop budget), not
/// confirmed-durable writes; `aborted` and `flush_failures` carry the
/// signals needed to reason about what actually landed.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Total operations completed across all workers.
    pub ops_done: u64,
    /// Total contention aborts observed.
    pub aborted: u64,
    /// Workers whose final cleanup flush terminally failed.
    pub flush_failures: u64,
    /// Number of worker threads.
    pub workers: usize,
    /// Wall-clock duration of the run in seconds.
    pub elapsed_secs: f64,
    /// Attempted operations per second.
    pub ops_per_sec: f64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Build a report from aggregated worker counters.
    pub fn new(totals: WorkerStats, workers: usize, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let ops_per_sec = if elapsed_secs > 0.0 {
            totals.ops_done as f64 / elapsed_secs
        } else {
            0.0
        };
        Self {
            ops_done: totals.ops_done,
            aborted: totals.aborted,
            flush_failures: totals.flush_failures,
            workers,
            elapsed_secs,
            ops_per_sec,
            finished_at: Utc::now(),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} operations done in {:.2}s", self.ops_done, self.elapsed_secs)?;
        writeln!(f, "  workers:        {}", self.workers)?;
        writeln!(f, "  throughput:     {:.0} ops/s", self.ops_per_sec)?;
        writeln!(f, "  aborts:         {}", self.aborted)?;
        write!(f, "  flush failures: {}", self.flush_failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_derivation() {
        let totals = WorkerStats {
            ops_done: 1000,
            aborted: 7,
            flush_failures: 0,
        };
        let report = RunReport::new(totals, 4, Duration::from_secs(2));
        assert_eq!(report.ops_done, 1000);
        assert_eq!(report.aborted, 7);
        assert!((report.ops_per_sec - 500.0).abs() < 1.0);
    }

    #[test]
    fn test_zero_elapsed_has_zero_throughput() {
        let report = RunReport::new(WorkerStats::default(), 1, Duration::ZERO);
        assert_eq!(report.ops_per_sec, 0.0);
    }

    #[test]
    fn test_display_mentions_counts() {
        let totals = WorkerStats {
            ops_done: 42,
            aborted: 3,
            flush_failures: 1,
        };
        let report = RunReport::new(totals, 2, Duration::from_millis(500));
        let s = report.to_string();
        assert!(s.contains("42 operations done"));
        assert!(s.contains("aborts:         3"));
        assert!(s.contains("flush failures: 1"));
    }

    #[test]
    fn test_serializes_to_json() {
        let report = RunReport::new(WorkerStats::default(), 1, Duration::from_secs(1));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"ops_done\":0"));
        assert!(json.contains("\"workers\":1"));
    }
}
