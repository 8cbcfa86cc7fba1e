mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Duration;
use common::{t0, World};
use imperium_lib::construction::scan;
use imperium_lib::notify::{NotifyError, NotificationSink, BUILDING_COMPLETED, SHIP_COMPLETED};
use imperium_lib::{
    BlueprintDraft, BlueprintModule, ConflictError, ConstructionManager, Error, GatingError,
    PlayerId, QueueKind, ResearchStatus, ShipClass, Store,
};
use serde_json::Value;

const KLEINE_DURASTAHLMINE: i64 = 2;
const DURASTAHLMINE: i64 = 1;

fn module(module_type_id: i64, level: u32, slot_position: u32) -> BlueprintModule {
    BlueprintModule {
        module_type_id,
        level,
        slot_position,
    }
}

fn hull_only_blueprint(world: &World) -> i64 {
    let mut draft = BlueprintDraft::new("Frachter", ShipClass::Transport);
    draft.add_module(module(2, 1, 0)).unwrap();
    draft.add_module(module(8, 2, 1)).unwrap();
    world
        .blueprints()
        .create(world.player.id, &draft, t0())
        .expect("blueprint saved")
        .id
}

struct FailingSink;

impl NotificationSink for FailingSink {
    fn publish(
        &self,
        _player_id: PlayerId,
        _event: &str,
        _payload: &Value,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("socket closed".to_string()))
    }
}

#[test]
fn ship_order_completes_once_build_time_elapsed() {
    let world = World::new();
    world.complete_research(&[1, 3]);
    let mut draft = BlueprintDraft::new("Jaeger", ShipClass::Fighter);
    draft.add_module(module(1, 2, 0)).unwrap();
    draft.add_module(module(2, 1, 1)).unwrap();
    let blueprint = world
        .blueprints()
        .create(world.player.id, &draft, t0())
        .unwrap();

    let construction = world.construction();
    let entry = construction
        .enqueue_ship(world.player.id, world.planet.id, blueprint.id, 2, t0())
        .unwrap();
    // ceil(4 * 2^1.5 + 3) = 15 minutes per ship.
    assert_eq!(entry.required_build_time_minutes, 30);

    let report = construction
        .scan(t0() + Duration::minutes(29))
        .unwrap();
    assert_eq!(report.not_due, 1);
    assert_eq!(report.completed, 0);
    assert!(world.store.ships_for_player(world.player.id).unwrap().is_empty());

    let report = construction.scan(t0() + Duration::minutes(30)).unwrap();
    assert_eq!(report.completed, 1);

    let ships = world.store.ships_for_player(world.player.id).unwrap();
    assert_eq!(ships.len(), 2);
    assert_eq!(ships[0].stats.hull, 50.0);
    assert!((ships[0].stats.damage - 11.5).abs() < 1e-9);
    assert_eq!(ships[0].planet_id, world.planet.id);

    let events = world.sink.list().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, SHIP_COMPLETED);
    assert_eq!(events[0].payload["quantity"], 2);
    assert_eq!(events[0].payload["ship_ids"].as_array().map(Vec::len), Some(2));

    let report = construction.scan(t0() + Duration::minutes(31)).unwrap();
    assert_eq!(report.examined, 0);
    assert_eq!(world.store.ships_for_player(world.player.id).unwrap().len(), 2);
}

#[test]
fn missing_research_blocks_ship_orders() {
    let world = World::new();
    let mut draft = BlueprintDraft::new("Jaeger", ShipClass::Fighter);
    draft.add_module(module(1, 1, 0)).unwrap();
    let blueprint = world
        .blueprints()
        .create(world.player.id, &draft, t0())
        .expect("saving ignores research");

    let err = world
        .construction()
        .enqueue_ship(world.player.id, world.planet.id, blueprint.id, 1, t0())
        .expect_err("Laserwaffen I missing");
    match err {
        Error::Gating(GatingError::MissingResearch { missing }) => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].research_id, 3);
            assert_eq!(missing[0].current_level, None);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parallel_scans_materialize_exactly_once() {
    let world = World::new();
    let blueprint_id = hull_only_blueprint(&world);
    let entry = world
        .construction()
        .enqueue_ship(world.player.id, world.planet.id, blueprint_id, 3, t0())
        .unwrap();
    let due = entry.due_at();

    let threads = 10;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let barrier = barrier.clone();
            let path = world.db_path();
            let catalog = world.catalog.clone();
            let sink = world.sink.clone();
            thread::spawn(move || {
                let store = Store::open(&path).expect("store opens");
                barrier.wait();
                scan(&store, &catalog, sink.as_ref(), due).expect("scan runs")
            })
        })
        .collect();

    let reports: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("scan thread"))
        .collect();

    let completed: usize = reports.iter().map(|r| r.completed).sum();
    let failed: usize = reports.iter().map(|r| r.failed).sum();
    assert_eq!(completed, 1);
    assert_eq!(failed, 0);
    assert_eq!(world.store.ships_for_player(world.player.id).unwrap().len(), 3);
    assert_eq!(world.events(), vec![SHIP_COMPLETED.to_string()]);
}

#[test]
fn building_completion_feeds_research_gates() {
    let world = World::new();
    world.add_buildings(DURASTAHLMINE, 1);
    let construction = world.construction();
    let entry = construction
        .enqueue_building(world.player.id, world.planet.id, KLEINE_DURASTAHLMINE, 1, t0())
        .unwrap();
    assert_eq!(entry.required_build_time_minutes, 15);

    let buildings = world.store.buildings_on_planet(world.planet.id).unwrap();
    assert_eq!(buildings.iter().filter(|b| !b.is_active).count(), 1);
    let status = |world: &World| {
        world
            .research()
            .status(world.player.id)
            .unwrap()
            .into_iter()
            .find(|v| v.research_id == 1)
            .unwrap()
            .status
    };
    assert_eq!(status(&world), ResearchStatus::Locked);

    construction.scan(entry.due_at()).unwrap();
    let buildings = world.store.buildings_on_planet(world.planet.id).unwrap();
    assert!(buildings.iter().all(|b| b.is_active));
    assert_eq!(status(&world), ResearchStatus::Available);
    assert_eq!(world.events(), vec![BUILDING_COMPLETED.to_string()]);
}

#[test]
fn missing_planet_is_skipped_and_retried() {
    let world = World::new();
    let construction = world.construction();
    let entry = construction
        .enqueue_building(world.player.id, world.planet.id, KLEINE_DURASTAHLMINE, 2, t0())
        .unwrap();
    world.store.delete_planet(world.planet.id).unwrap();

    for _ in 0..2 {
        let report = construction.scan(entry.due_at()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.completed, 0);
        assert_eq!(report.failed, 0);
    }
    let pending = world.store.pending_entries().unwrap();
    assert_eq!(pending.len(), 1);
    assert!(world.events().is_empty());
}

#[test]
fn failed_notification_does_not_roll_back_completion() {
    let world = World::new();
    let construction = ConstructionManager::new(
        world.store.clone(),
        world.catalog.clone(),
        Arc::new(FailingSink),
    );
    let entry = construction
        .enqueue_building(world.player.id, world.planet.id, DURASTAHLMINE, 1, t0())
        .unwrap();

    let report = construction.scan(entry.due_at()).unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.failed, 0);
    assert!(world.store.pending_entries().unwrap().is_empty());
    assert!(world
        .store
        .buildings_on_planet(world.planet.id)
        .unwrap()
        .iter()
        .all(|b| b.is_active));
}

#[test]
fn one_broken_entry_does_not_stop_the_scan() {
    let world = World::new();
    let construction = world.construction();
    let blueprint_id = hull_only_blueprint(&world);
    construction
        .enqueue_ship(world.player.id, world.planet.id, blueprint_id, 1, t0())
        .unwrap();
    let building = construction
        .enqueue_building(world.player.id, world.planet.id, DURASTAHLMINE, 1, t0())
        .unwrap();

    // A blueprint referencing a module that has since left the catalog.
    let mut draft = BlueprintDraft::new("Alt", ShipClass::Transport);
    draft.add_module(module(2, 1, 0)).unwrap();
    let stale = world.store.insert_blueprint(world.player.id, &draft, t0()).unwrap();
    let mut broken = draft.clone();
    broken.modules = vec![module(4242, 1, 0)];
    world.store.update_blueprint(stale.id, &broken, t0()).unwrap();
    world
        .store
        .insert_ship_order(world.player.id, world.planet.id, stale.id, 1, t0(), 1)
        .unwrap();

    let report = construction.scan(building.due_at() + Duration::hours(1)).unwrap();
    assert_eq!(report.examined, 3);
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(world.store.pending_entries().unwrap().len(), 1);
}

#[test]
fn cancel_returns_the_removed_order() {
    let world = World::new();
    let construction = world.construction();
    let entry = construction
        .enqueue_building(world.player.id, world.planet.id, DURASTAHLMINE, 2, t0())
        .unwrap();

    let intruder = world.store.create_player("Bo", None).unwrap();
    let err = construction
        .cancel_entry(intruder.id, QueueKind::Building, entry.id)
        .expect_err("not theirs");
    assert!(matches!(err, Error::NotOwned { .. }));

    let removed = construction
        .cancel_entry(world.player.id, QueueKind::Building, entry.id)
        .unwrap();
    assert_eq!(removed, entry);
    assert!(world
        .store
        .buildings_on_planet(world.planet.id)
        .unwrap()
        .is_empty());

    let err = construction
        .cancel_entry(world.player.id, QueueKind::Building, entry.id)
        .expect_err("already gone");
    assert!(matches!(err, Error::UnknownQueueEntry { .. }));
}

#[test]
fn orders_are_validated_before_queueing() {
    let world = World::new();
    let construction = world.construction();

    let err = construction
        .enqueue_building(world.player.id, world.planet.id, DURASTAHLMINE, 0, t0())
        .expect_err("zero quantity");
    assert!(matches!(err, Error::InvalidQuantity));

    let err = construction
        .enqueue_building(world.player.id, world.planet.id, 99, 1, t0())
        .expect_err("unknown type");
    assert!(matches!(err, Error::UnknownBuildingType(99)));

    let other = world.store.create_player("Bo", None).unwrap();
    let foreign = world.store.create_planet(other.id, "Hoth").unwrap();
    let err = construction
        .enqueue_building(world.player.id, foreign.id, DURASTAHLMINE, 1, t0())
        .expect_err("foreign planet");
    assert!(matches!(err, Error::NotOwned { entity: "planet", .. }));
}

#[test]
fn blueprint_with_pending_orders_cannot_be_deleted() {
    let world = World::new();
    let blueprint_id = hull_only_blueprint(&world);
    let construction = world.construction();
    let entry = construction
        .enqueue_ship(world.player.id, world.planet.id, blueprint_id, 1, t0())
        .unwrap();

    let err = world
        .blueprints()
        .delete(world.player.id, blueprint_id)
        .expect_err("pending order");
    assert!(matches!(
        err,
        Error::Conflict(ConflictError::BlueprintInUse { pending: 1, .. })
    ));

    construction.scan(entry.due_at()).unwrap();
    world
        .blueprints()
        .delete(world.player.id, blueprint_id)
        .expect("no pending orders left");
}

#[test]
fn blueprint_with_pending_orders_cannot_be_edited() {
    let world = World::new();
    let blueprint_id = hull_only_blueprint(&world);
    let expected = world
        .blueprints()
        .report(world.player.id, blueprint_id)
        .unwrap()
        .stats;
    let construction = world.construction();
    let entry = construction
        .enqueue_ship(world.player.id, world.planet.id, blueprint_id, 1, t0())
        .unwrap();

    let mut armed = BlueprintDraft::new("Frachter", ShipClass::Transport);
    armed.add_module(module(9, 5, 0)).unwrap();
    let err = world
        .blueprints()
        .update(world.player.id, blueprint_id, &armed, t0())
        .expect_err("pending order pins the design");
    assert!(matches!(
        err,
        Error::Conflict(ConflictError::BlueprintInUse { pending: 1, .. })
    ));

    let report = construction.scan(entry.due_at()).unwrap();
    assert_eq!(report.completed, 1);
    let ships = world.store.ships_for_player(world.player.id).unwrap();
    assert_eq!(ships[0].stats, expected);
    assert_eq!(ships[0].stats.damage, 0.0);

    world
        .blueprints()
        .update(world.player.id, blueprint_id, &armed, t0())
        .expect("no pending orders left");
}
