//! The periodic completion scan.
//!
//! Each pass loads every pending entry and completes the ones whose build time
//! has elapsed. Entries are isolated from each other: a missing planet or
//! blueprint, a store error or a failing notification only affects that one
//! entry, which stays pending and is retried on the next pass.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::blueprint::calculate;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::notify::{NotificationSink, BUILDING_COMPLETED, SHIP_COMPLETED};
use crate::research::ResearchLevels;
use crate::store::Store;

use super::{QueueEntry, QueueKind};

/// Per-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub examined: usize,
    pub completed: usize,
    pub not_due: usize,
    /// Parent record missing; retried next pass.
    pub skipped: usize,
    /// Another scan won the compare-and-set.
    pub already_completed: usize,
    pub failed: usize,
}

enum Outcome {
    NotDue,
    Completed,
    AlreadyCompleted,
    Skipped,
}

/// Complete every pending entry that is due at `now`.
///
/// Only a failure to list pending entries is returned as an error.
pub fn scan(
    store: &Store,
    catalog: &Catalog,
    sink: &dyn NotificationSink,
    now: DateTime<Utc>,
) -> Result<ScanReport> {
    let pending = store.pending_entries()?;
    let mut report = ScanReport {
        examined: pending.len(),
        ..ScanReport::default()
    };

    for entry in &pending {
        let outcome = match entry.kind {
            QueueKind::Ship => complete_ship(store, catalog, sink, entry, now),
            QueueKind::Building => complete_building(store, sink, entry, now),
        };
        match outcome {
            Ok(Outcome::NotDue) => report.not_due += 1,
            Ok(Outcome::Completed) => report.completed += 1,
            Ok(Outcome::AlreadyCompleted) => report.already_completed += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(err) => {
                warn!(
                    entry_id = entry.id,
                    kind = %entry.kind,
                    error = %err,
                    "construction entry failed; will retry"
                );
                report.failed += 1;
            }
        }
    }

    debug!(
        examined = report.examined,
        completed = report.completed,
        skipped = report.skipped,
        failed = report.failed,
        "construction scan finished"
    );
    Ok(report)
}

fn complete_ship(
    store: &Store,
    catalog: &Catalog,
    sink: &dyn NotificationSink,
    entry: &QueueEntry,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    if !entry.is_due(now) {
        return Ok(Outcome::NotDue);
    }
    if store.planet(entry.planet_id)?.is_none() {
        warn!(
            entry_id = entry.id,
            planet_id = entry.planet_id,
            "ship order references a missing planet; skipping"
        );
        return Ok(Outcome::Skipped);
    }
    let Some(blueprint) = store.blueprint(entry.target_id)? else {
        warn!(
            entry_id = entry.id,
            blueprint_id = entry.target_id,
            "ship order references a missing blueprint; skipping"
        );
        return Ok(Outcome::Skipped);
    };

    // Research was checked when the order was placed.
    let report = calculate(
        blueprint.ship_class,
        &blueprint.modules,
        &catalog.modules,
        &ResearchLevels::default(),
    )?;

    let Some(ship_ids) = store.complete_ship_entry(entry, &report.stats, now)? else {
        debug!(entry_id = entry.id, "ship order already completed by another scan");
        return Ok(Outcome::AlreadyCompleted);
    };

    info!(
        entry_id = entry.id,
        player_id = entry.player_id,
        quantity = entry.quantity,
        "ship order completed"
    );
    let payload = json!({
        "entry_id": entry.id,
        "player_id": entry.player_id,
        "planet_id": entry.planet_id,
        "blueprint_id": entry.target_id,
        "quantity": entry.quantity,
        "ship_ids": ship_ids,
    });
    notify(sink, entry, SHIP_COMPLETED, &payload);
    Ok(Outcome::Completed)
}

fn complete_building(
    store: &Store,
    sink: &dyn NotificationSink,
    entry: &QueueEntry,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    if !entry.is_due(now) {
        return Ok(Outcome::NotDue);
    }
    if store.planet(entry.planet_id)?.is_none() {
        warn!(
            entry_id = entry.id,
            planet_id = entry.planet_id,
            "building order references a missing planet; skipping"
        );
        return Ok(Outcome::Skipped);
    }

    let Some(building_ids) = store.complete_building_entry(entry, now)? else {
        debug!(entry_id = entry.id, "building order already completed by another scan");
        return Ok(Outcome::AlreadyCompleted);
    };

    info!(
        entry_id = entry.id,
        player_id = entry.player_id,
        quantity = entry.quantity,
        "building order completed"
    );
    let payload = json!({
        "entry_id": entry.id,
        "player_id": entry.player_id,
        "planet_id": entry.planet_id,
        "building_type_id": entry.target_id,
        "quantity": entry.quantity,
        "building_ids": building_ids,
    });
    notify(sink, entry, BUILDING_COMPLETED, &payload);
    Ok(Outcome::Completed)
}

fn notify(
    sink: &dyn NotificationSink,
    entry: &QueueEntry,
    event: &str,
    payload: &serde_json::Value,
) {
    if let Err(err) = sink.publish(entry.player_id, event, payload) {
        warn!(entry_id = entry.id, event, error = %err, "failed to publish completion");
    }
}
