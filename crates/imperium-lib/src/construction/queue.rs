use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::blueprint::{calculate, BlueprintId};
use crate::catalog::{BuildingTypeId, Catalog};
use crate::error::{Error, GatingError, Result};
use crate::notify::NotificationSink;
use crate::store::Store;
use crate::world::{Planet, PlanetId, PlayerId};

use super::scanner::{scan, ScanReport};
use super::{QueueEntry, QueueEntryId, QueueKind};

/// Creates, cancels and completes construction orders.
///
/// Resource deduction is the caller's job: an order is accepted once the
/// caller has charged for it, and [`ConstructionManager::cancel_entry`] returns
/// the removed entry so the caller can refund it.
pub struct ConstructionManager {
    store: Arc<Store>,
    catalog: Arc<Catalog>,
    sink: Arc<dyn NotificationSink>,
}

impl ConstructionManager {
    pub fn new(store: Arc<Store>, catalog: Arc<Catalog>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            catalog,
            sink,
        }
    }

    /// Queue `quantity` ships of a blueprint on one of the player's planets.
    ///
    /// The blueprint's research requirements must be met. The build time is
    /// the blueprint's class-scaled build time multiplied by `quantity`.
    pub fn enqueue_ship(
        &self,
        player_id: PlayerId,
        planet_id: PlanetId,
        blueprint_id: BlueprintId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<QueueEntry> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        self.owned_planet(player_id, planet_id)?;

        let blueprint = self
            .store
            .blueprint(blueprint_id)?
            .ok_or(Error::UnknownBlueprint(blueprint_id))?;
        if blueprint.player_id != player_id {
            return Err(Error::NotOwned {
                entity: "blueprint",
                id: blueprint_id,
                player_id,
            });
        }

        let levels = self
            .store
            .research_levels(player_id, &self.catalog.research)?;
        let report = calculate(
            blueprint.ship_class,
            &blueprint.modules,
            &self.catalog.modules,
            &levels,
        )?;
        if !report.research.is_valid {
            return Err(GatingError::MissingResearch {
                missing: report.research.missing,
            }
            .into());
        }

        let minutes = report.build_time_minutes.saturating_mul(quantity);
        let entry = self.store.insert_ship_order(
            player_id,
            planet_id,
            blueprint_id,
            quantity,
            now,
            minutes,
        )?;
        info!(
            player_id,
            planet_id,
            blueprint_id,
            quantity,
            entry_id = entry.id,
            minutes,
            "ship order queued"
        );
        Ok(entry)
    }

    /// Queue `quantity` buildings of one type. The buildings exist inactive
    /// until the order completes.
    pub fn enqueue_building(
        &self,
        player_id: PlayerId,
        planet_id: PlanetId,
        building_type_id: BuildingTypeId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<QueueEntry> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        let building_type = self
            .catalog
            .buildings
            .get(building_type_id)
            .ok_or(Error::UnknownBuildingType(building_type_id))?;
        self.owned_planet(player_id, planet_id)?;

        let minutes = building_type.build_time_minutes.saturating_mul(quantity);
        let entry = self.store.insert_building_order(
            player_id,
            planet_id,
            building_type_id,
            quantity,
            now,
            minutes,
        )?;
        info!(
            player_id,
            planet_id,
            building_type_id,
            quantity,
            entry_id = entry.id,
            minutes,
            "building order queued"
        );
        Ok(entry)
    }

    /// Remove a pending order owned by the player and return it.
    pub fn cancel_entry(
        &self,
        player_id: PlayerId,
        kind: QueueKind,
        id: QueueEntryId,
    ) -> Result<QueueEntry> {
        let unknown = || Error::UnknownQueueEntry {
            kind: kind.as_str(),
            id,
        };
        let entry = self
            .store
            .queue_entry(kind, id)?
            .filter(QueueEntry::is_pending)
            .ok_or_else(unknown)?;
        if entry.player_id != player_id {
            return Err(Error::NotOwned {
                entity: "queue entry",
                id,
                player_id,
            });
        }
        let removed = self.store.delete_pending_entry(kind, id)?.ok_or_else(unknown)?;
        info!(player_id, entry_id = id, kind = %kind, "construction order cancelled");
        Ok(removed)
    }

    pub fn entries_for_player(&self, player_id: PlayerId) -> Result<Vec<QueueEntry>> {
        self.store.entries_for_player(player_id)
    }

    /// Run one completion pass over all pending entries.
    pub fn scan(&self, now: DateTime<Utc>) -> Result<ScanReport> {
        scan(&self.store, &self.catalog, self.sink.as_ref(), now)
    }

    fn owned_planet(&self, player_id: PlayerId, planet_id: PlanetId) -> Result<Planet> {
        let planet = self
            .store
            .planet(planet_id)?
            .ok_or(Error::UnknownPlanet(planet_id))?;
        if planet.player_id != player_id {
            return Err(Error::NotOwned {
                entity: "planet",
                id: planet_id,
                player_id,
            });
        }
        Ok(planet)
    }
}
