//! Periodic completion pass over the construction queue.
//!
//! Each pass runs on the blocking pool because the store is synchronous
//! SQLite. Overlapping passes are safe: completion is a compare-and-set, so
//! a second pass that races the first counts the entry as already completed.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use imperium_lib::ScanReport;
use imperium_service_shared::{record_scan, AppState};

/// Spawn a task that scans the queue every `every` until the runtime stops.
pub fn spawn_scan_loop(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = every.as_secs_f64(), "construction scan loop started");
        loop {
            interval.tick().await;
            run_scan(&state, Utc::now()).await;
        }
    })
}

/// Run one pass as of `now`. Returns `None` when the pass failed; the
/// failure is logged and the next pass retries.
pub async fn run_scan(state: &AppState, now: DateTime<Utc>) -> Option<ScanReport> {
    let worker = state.clone();
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || worker.construction().scan(now)).await;

    match result {
        Ok(Ok(report)) => {
            record_scan(&report, started.elapsed());
            if report.completed > 0 || report.failed > 0 {
                info!(
                    examined = report.examined,
                    completed = report.completed,
                    skipped = report.skipped,
                    already_completed = report.already_completed,
                    failed = report.failed,
                    "construction scan finished"
                );
            } else {
                debug!(examined = report.examined, "construction scan found nothing due");
            }
            Some(report)
        }
        Ok(Err(e)) => {
            error!(error = %e, "construction scan failed");
            None
        }
        Err(e) => {
            error!(error = %e, "construction scan task panicked");
            None
        }
    }
}
