mod common;

use common::{fixture_catalog, t0, World};
use imperium_lib::blueprint::{calculate, cost_factor};
use imperium_lib::{
    BlueprintDraft, BlueprintModule, CombatRating, Error, ResearchLevels, ShipClass,
    ValidationError,
};

fn module(module_type_id: i64, level: u32, slot_position: u32) -> BlueprintModule {
    BlueprintModule {
        module_type_id,
        level,
        slot_position,
    }
}

#[test]
fn fighter_with_laser_and_plating() {
    let catalog = fixture_catalog();
    let modules = [module(1, 2, 0), module(2, 1, 1)];
    let report = calculate(
        ShipClass::Fighter,
        &modules,
        &catalog.modules,
        &ResearchLevels::default(),
    )
    .expect("valid design");

    assert!((report.modules[0].costs.credits - 282.842_712_474_619).abs() < 1e-6);
    assert_eq!(report.stats.hull, 50.0);
    assert!((report.stats.damage - 11.5).abs() < 1e-9);
    assert_eq!(report.build_time_minutes, 15);
    assert_eq!(report.combat_rating, CombatRating::Mittel);
    assert!(!report.research.is_valid);
}

#[test]
fn costs_grow_strictly_with_level() {
    let catalog = fixture_catalog();
    let mut previous = 0.0;
    for level in 1..=5 {
        let report = calculate(
            ShipClass::Fighter,
            &[module(2, level, 0)],
            &catalog.modules,
            &ResearchLevels::default(),
        )
        .unwrap();
        assert!((report.costs.credits - 80.0 * cost_factor(level)).abs() < 1e-9);
        assert!(report.costs.credits > previous);
        previous = report.costs.credits;
    }
}

#[test]
fn turbolaser_needs_second_laser_level() {
    let world = World::new();
    let blueprints = world.blueprints();
    let modules = [module(9, 1, 0)];

    world.complete_research(&[1, 3]);
    let report = blueprints
        .preview(world.player.id, ShipClass::Corvette, &modules)
        .unwrap();
    assert!(!report.research.is_valid);
    assert_eq!(report.research.missing[0].required_level, 2);
    assert_eq!(report.research.missing[0].current_level, Some(1));

    world.complete_research(&[4]);
    let report = blueprints
        .preview(world.player.id, ShipClass::Corvette, &modules)
        .unwrap();
    assert!(report.research.is_valid);
}

#[test]
fn saving_rejects_invalid_designs_without_truncating() {
    let world = World::new();
    let blueprints = world.blueprints();

    let draft = BlueprintDraft {
        name: "Ueberladen".to_string(),
        ship_class: ShipClass::Fighter,
        modules: (0..5).map(|slot| module(2, 1, slot)).collect(),
    };
    let err = blueprints
        .create(world.player.id, &draft, t0())
        .expect_err("five modules on a fighter");
    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooManyModules { count: 5, max_slots: 4 })
    ));

    let draft = BlueprintDraft {
        name: "Zu stark".to_string(),
        ship_class: ShipClass::Fighter,
        modules: vec![module(7, 5, 0)],
    };
    assert!(matches!(
        blueprints.create(world.player.id, &draft, t0()),
        Err(Error::Validation(ValidationError::LevelExceedsMax { max_level: 4, .. }))
    ));
    assert!(blueprints.list(world.player.id).unwrap().is_empty());
}

#[test]
fn saved_blueprints_round_trip_through_the_store() {
    let world = World::new();
    let blueprints = world.blueprints();
    let mut draft = BlueprintDraft::new("Patrouille", ShipClass::Corvette);
    draft.add_module(module(5, 2, 3)).unwrap();
    draft.add_module(module(2, 1, 0)).unwrap();
    draft.add_module(module(7, 1, 1)).unwrap();

    let saved = blueprints.create(world.player.id, &draft, t0()).unwrap();
    let loaded = blueprints.get(world.player.id, saved.id).unwrap();
    assert_eq!(loaded.modules, draft.modules);

    let report = blueprints.report(world.player.id, saved.id).unwrap();
    assert!(report.research.is_valid);
    assert!((report.stats.speed - 23.0).abs() < 1e-9);

    let other = world.store.create_player("Bo", None).unwrap();
    assert!(matches!(
        blueprints.get(other.id, saved.id),
        Err(Error::NotOwned { .. })
    ));

    draft.modules.pop();
    let updated = blueprints
        .update(world.player.id, saved.id, &draft, t0())
        .unwrap();
    assert_eq!(updated.modules.len(), 2);
    assert_eq!(blueprints.list(world.player.id).unwrap().len(), 1);

    blueprints.delete(world.player.id, saved.id).unwrap();
    assert!(matches!(
        blueprints.get(world.player.id, saved.id),
        Err(Error::UnknownBlueprint(_))
    ));
}
