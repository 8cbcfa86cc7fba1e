#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use imperium_lib::catalog::{Catalog, FactionId, ResearchId};
use imperium_lib::research::PlayerResearchProgress;
use imperium_lib::{
    BlueprintManager, ConstructionManager, MemorySink, Planet, Player, ResearchManager, Store,
};
use tempfile::TempDir;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_catalog() -> Catalog {
    Catalog::load(&fixtures_dir()).expect("fixture catalogs load")
}

/// A fixed instant so build times are easy to reason about.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_767_225_600_000).expect("valid timestamp")
}

/// One player with one planet on an on-disk database.
pub struct World {
    pub dir: TempDir,
    pub store: Arc<Store>,
    pub catalog: Arc<Catalog>,
    pub sink: Arc<MemorySink>,
    pub player: Player,
    pub planet: Planet,
}

impl World {
    pub fn new() -> Self {
        Self::with_faction(None)
    }

    pub fn with_faction(faction_id: Option<FactionId>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(&dir.path().join("imperium.db")).expect("store opens");
        let player = store.create_player("Ada", faction_id).expect("player");
        let planet = store.create_planet(player.id, "Coruscant").expect("planet");
        Self {
            dir,
            store: Arc::new(store),
            catalog: Arc::new(fixture_catalog()),
            sink: Arc::new(MemorySink::new()),
            player,
            planet,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("imperium.db")
    }

    pub fn research(&self) -> ResearchManager {
        ResearchManager::new(self.store.clone(), self.catalog.clone(), self.sink.clone())
    }

    pub fn construction(&self) -> ConstructionManager {
        ConstructionManager::new(self.store.clone(), self.catalog.clone(), self.sink.clone())
    }

    pub fn blueprints(&self) -> BlueprintManager {
        BlueprintManager::new(self.store.clone(), self.catalog.clone())
    }

    pub fn add_buildings(&self, building_type_id: i64, count: usize) {
        for _ in 0..count {
            self.store
                .add_building(self.planet.id, building_type_id)
                .expect("building");
        }
    }

    /// Mark research nodes completed without going through the gates.
    pub fn complete_research(&self, ids: &[ResearchId]) {
        for &id in ids {
            let node = self.catalog.research.get(id).expect("fixture node");
            let row = PlayerResearchProgress::start(self.player.id, node, t0());
            self.store
                .insert_research_progress(&row)
                .expect("start research");
            let advance = self
                .store
                .advance_research(self.player.id, id, node.max_progress(), t0())
                .expect("advance")
                .expect("active row");
            assert!(advance.completed_now);
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.sink
            .list()
            .expect("sink readable")
            .into_iter()
            .map(|n| n.event)
            .collect()
    }
}
