use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::world::PlayerId;

use super::calculator::{calculate, BlueprintReport};
use super::{Blueprint, BlueprintDraft, BlueprintId, BlueprintModule, ShipClass};

/// Player-facing blueprint operations on top of the store.
///
/// Saving validates structure only. Research shortfalls are reported by
/// [`BlueprintManager::report`] and enforced when ships are ordered.
pub struct BlueprintManager {
    store: Arc<Store>,
    catalog: Arc<Catalog>,
}

impl BlueprintManager {
    pub fn new(store: Arc<Store>, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Calculate an unsaved design against the player's research.
    pub fn preview(
        &self,
        player_id: PlayerId,
        ship_class: ShipClass,
        modules: &[BlueprintModule],
    ) -> Result<BlueprintReport> {
        let levels = self
            .store
            .research_levels(player_id, &self.catalog.research)?;
        Ok(calculate(ship_class, modules, &self.catalog.modules, &levels)?)
    }

    pub fn create(
        &self,
        player_id: PlayerId,
        draft: &BlueprintDraft,
        now: DateTime<Utc>,
    ) -> Result<Blueprint> {
        if self.store.player(player_id)?.is_none() {
            return Err(Error::UnknownPlayer(player_id));
        }
        draft.validate(&self.catalog.modules)?;
        let blueprint = self.store.insert_blueprint(player_id, draft, now)?;
        info!(
            player_id,
            blueprint_id = blueprint.id,
            ship_class = %blueprint.ship_class,
            modules = blueprint.modules.len(),
            "blueprint saved"
        );
        Ok(blueprint)
    }

    pub fn update(
        &self,
        player_id: PlayerId,
        id: BlueprintId,
        draft: &BlueprintDraft,
        now: DateTime<Utc>,
    ) -> Result<Blueprint> {
        self.get(player_id, id)?;
        draft.validate(&self.catalog.modules)?;
        let blueprint = self
            .store
            .update_blueprint(id, draft, now)?
            .ok_or(Error::UnknownBlueprint(id))?;
        info!(player_id, blueprint_id = id, "blueprint updated");
        Ok(blueprint)
    }

    /// Fetch a blueprint the player owns.
    pub fn get(&self, player_id: PlayerId, id: BlueprintId) -> Result<Blueprint> {
        let blueprint = self.store.blueprint(id)?.ok_or(Error::UnknownBlueprint(id))?;
        if blueprint.player_id != player_id {
            return Err(Error::NotOwned {
                entity: "blueprint",
                id,
                player_id,
            });
        }
        Ok(blueprint)
    }

    pub fn list(&self, player_id: PlayerId) -> Result<Vec<Blueprint>> {
        self.store.blueprints_for_player(player_id)
    }

    /// Stats, costs and research validity of a saved blueprint.
    pub fn report(&self, player_id: PlayerId, id: BlueprintId) -> Result<BlueprintReport> {
        let blueprint = self.get(player_id, id)?;
        self.preview(player_id, blueprint.ship_class, &blueprint.modules)
    }

    pub fn delete(&self, player_id: PlayerId, id: BlueprintId) -> Result<()> {
        self.get(player_id, id)?;
        if !self.store.delete_blueprint(id)? {
            return Err(Error::UnknownBlueprint(id));
        }
        info!(player_id, blueprint_id = id, "blueprint deleted");
        Ok(())
    }
}
