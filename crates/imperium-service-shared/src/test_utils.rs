//! Fixtures for handler tests: fixture catalogs, an in-memory store and one
//! seeded player owning one planet.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use imperium_lib::{Catalog, MemorySink, Planet, Player, Store};

use crate::state::AppState;

pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures");

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(FIXTURES_DIR)
}

pub struct TestWorld {
    pub state: AppState,
    pub sink: Arc<MemorySink>,
    pub player: Player,
    pub planet: Planet,
}

/// A fresh state per call so tests do not share database rows.
///
/// # Panics
///
/// Panics if the fixture catalogs cannot be loaded.
pub fn test_state() -> TestWorld {
    let catalog = Catalog::load(&fixtures_dir())
        .unwrap_or_else(|e| panic!("failed to load fixtures from {FIXTURES_DIR}: {e}"));
    let store = Store::open_in_memory().expect("in-memory store");
    let player = store.create_player("Ava", None).expect("seed player");
    let planet = store.create_planet(player.id, "Coruscant").expect("seed planet");
    let sink = Arc::new(MemorySink::new());

    TestWorld {
        state: AppState::from_components(store, catalog, sink.clone()),
        sink,
        player,
        planet,
    }
}

pub fn test_request_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("test-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_one_player_and_planet() {
        let world = test_state();
        let planets = world.state.store().planets_for_player(world.player.id).unwrap();
        assert_eq!(planets, vec![world.planet.clone()]);
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
