mod common;

use common::fixtures_dir;
use imperium_lib::catalog::{
    BuildingCatalog, Catalog, ModuleCatalog, ModuleCategory, ResearchCatalog, ResearchGate,
    MODULES_FILENAME, RESEARCH_FILENAME,
};
use imperium_lib::{Error, Resource};

#[test]
fn loads_all_fixture_catalogs() {
    let catalog = Catalog::load(&fixtures_dir()).expect("fixtures load");
    assert_eq!(catalog.modules.len(), 10);
    assert_eq!(catalog.research.len(), 10);
    assert_eq!(catalog.buildings.len(), 6);
    assert_eq!(
        catalog.modules.source_path(),
        Some(fixtures_dir().join(MODULES_FILENAME).as_path())
    );

    let hyperdrives = catalog
        .modules
        .iter()
        .filter(|m| m.category == ModuleCategory::Hyperdrive)
        .count();
    assert_eq!(hyperdrives, 2);
}

#[test]
fn research_tree_has_expected_gates() {
    let catalog = Catalog::load(&fixtures_dir()).unwrap();
    let metallurgie = catalog.research.get(1).unwrap();
    assert_eq!(
        metallurgie.gate,
        ResearchGate::Production {
            resource: Resource::Durastahl,
            per_tick: 30,
            total: 600
        }
    );

    let chain: Vec<i64> = catalog.research.chain(4).map(|n| n.id).collect();
    assert_eq!(chain, vec![4, 3, 1]);

    let labs = catalog
        .buildings
        .iter()
        .filter(|b| b.is_research_lab)
        .count();
    assert_eq!(labs, 1);
}

#[test]
fn unknown_category_is_rejected() {
    let csv = std::fs::read_to_string(fixtures_dir().join(MODULES_FILENAME))
        .unwrap()
        .replace("SENSORS", "TELEPORTER");
    let err = ModuleCatalog::from_reader(csv.as_bytes()).expect_err("bad category");
    match err {
        Error::CatalogValidation { catalog, message } => {
            assert_eq!(catalog, "modules.csv");
            assert!(message.contains("TELEPORTER"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_file_is_reported_with_path() {
    let path = fixtures_dir().join("does_not_exist.csv");
    let err = ResearchCatalog::from_path(&path).expect_err("missing");
    assert!(matches!(err, Error::CatalogNotFound { path: p } if p == path));
}

#[test]
fn module_requiring_unknown_research_is_rejected() {
    let csv = std::fs::read_to_string(fixtures_dir().join(MODULES_FILENAME))
        .unwrap()
        .replace(",10,3,2", ",10,99,2");
    let modules = ModuleCatalog::from_reader(csv.as_bytes()).expect("modules parse on their own");
    let research = ResearchCatalog::from_path(&fixtures_dir().join(RESEARCH_FILENAME)).unwrap();

    let err = Catalog::from_parts(modules, research, BuildingCatalog::default())
        .expect_err("dangling research reference");
    match err {
        Error::CatalogValidation { catalog, message } => {
            assert_eq!(catalog, MODULES_FILENAME);
            assert!(message.contains("module 9"));
            assert!(message.contains("unknown research 99"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
