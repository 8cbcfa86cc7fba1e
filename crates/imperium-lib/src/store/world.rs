use rusqlite::{params, OptionalExtension, Row};

use crate::catalog::{BuildingCatalog, BuildingTypeId, FactionId};
use crate::error::Result;
use crate::world::{Building, Planet, PlanetId, Player, PlayerEconomy, PlayerId, Ship};

use super::{conversion_error, from_millis, unsigned, Store};

impl Store {
    pub fn create_player(&self, name: &str, faction_id: Option<FactionId>) -> Result<Player> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO players (name, faction_id) VALUES (?1, ?2)",
            params![name, faction_id],
        )?;
        Ok(Player {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            faction_id,
        })
    }

    pub fn player(&self, id: PlayerId) -> Result<Option<Player>> {
        let conn = self.connection();
        let player = conn
            .query_row(
                "SELECT id, name, faction_id FROM players WHERE id = ?1",
                [id],
                |row| {
                    Ok(Player {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        faction_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(player)
    }

    pub fn create_planet(&self, player_id: PlayerId, name: &str) -> Result<Planet> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO planets (player_id, name) VALUES (?1, ?2)",
            params![player_id, name],
        )?;
        Ok(Planet {
            id: conn.last_insert_rowid(),
            player_id,
            name: name.to_string(),
        })
    }

    pub fn planet(&self, id: PlanetId) -> Result<Option<Planet>> {
        let conn = self.connection();
        let planet = conn
            .query_row(
                "SELECT id, player_id, name FROM planets WHERE id = ?1",
                [id],
                row_to_planet,
            )
            .optional()?;
        Ok(planet)
    }

    pub fn planets_for_player(&self, player_id: PlayerId) -> Result<Vec<Planet>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT id, player_id, name FROM planets WHERE player_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([player_id], row_to_planet)?;
        let mut planets = Vec::new();
        for planet in rows {
            planets.push(planet?);
        }
        Ok(planets)
    }

    /// Remove a planet record. Buildings and queue entries referencing it stay.
    pub fn delete_planet(&self, id: PlanetId) -> Result<bool> {
        let conn = self.connection();
        let removed = conn.execute("DELETE FROM planets WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    /// Place an already active building, bypassing the construction queue.
    pub fn add_building(
        &self,
        planet_id: PlanetId,
        building_type_id: BuildingTypeId,
    ) -> Result<Building> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO buildings (planet_id, building_type_id, is_active) VALUES (?1, ?2, 1)",
            params![planet_id, building_type_id],
        )?;
        Ok(Building {
            id: conn.last_insert_rowid(),
            planet_id,
            building_type_id,
            is_active: true,
            queue_entry_id: None,
        })
    }

    pub fn buildings_on_planet(&self, planet_id: PlanetId) -> Result<Vec<Building>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT id, planet_id, building_type_id, is_active, queue_entry_id \
             FROM buildings WHERE planet_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([planet_id], |row| {
            Ok(Building {
                id: row.get(0)?,
                planet_id: row.get(1)?,
                building_type_id: row.get(2)?,
                is_active: row.get(3)?,
                queue_entry_id: row.get(4)?,
            })
        })?;
        let mut buildings = Vec::new();
        for building in rows {
            buildings.push(building?);
        }
        Ok(buildings)
    }

    /// Sum production and labs over the active buildings on the player's planets.
    ///
    /// Building types missing from the catalog contribute nothing.
    pub fn player_economy(
        &self,
        player_id: PlayerId,
        catalog: &BuildingCatalog,
    ) -> Result<PlayerEconomy> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT b.building_type_id, COUNT(*) FROM buildings b \
             JOIN planets p ON p.id = b.planet_id \
             WHERE p.player_id = ?1 AND b.is_active = 1 \
             GROUP BY b.building_type_id",
        )?;
        let rows = stmt.query_map([player_id], |row| {
            Ok((row.get::<_, BuildingTypeId>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut economy = PlayerEconomy::default();
        for row in rows {
            let (type_id, count) = row?;
            let count = unsigned(count);
            let Some(building_type) = catalog.get(type_id) else {
                continue;
            };
            if let Some(output) = building_type.output {
                economy
                    .production
                    .add(output.resource, output.per_tick.saturating_mul(count));
            }
            if building_type.is_research_lab {
                economy.lab_count = economy
                    .lab_count
                    .saturating_add(u32::try_from(count).unwrap_or(u32::MAX));
            }
        }
        Ok(economy)
    }

    pub fn ships_for_player(&self, player_id: PlayerId) -> Result<Vec<Ship>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT id, player_id, planet_id, blueprint_id, stats, created_at \
             FROM ships WHERE player_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([player_id], row_to_ship)?;
        let mut ships = Vec::new();
        for ship in rows {
            ships.push(ship?);
        }
        Ok(ships)
    }
}

fn row_to_planet(row: &Row<'_>) -> rusqlite::Result<Planet> {
    Ok(Planet {
        id: row.get(0)?,
        player_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn row_to_ship(row: &Row<'_>) -> rusqlite::Result<Ship> {
    let stats: String = row.get(4)?;
    Ok(Ship {
        id: row.get(0)?,
        player_id: row.get(1)?,
        planet_id: row.get(2)?,
        blueprint_id: row.get(3)?,
        stats: serde_json::from_str(&stats).map_err(|err| conversion_error(4, err))?,
        created_at: from_millis(row.get(5)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;

    const BUILDINGS: &str = "id,name,build_time_minutes,produces,production_per_tick,is_research_lab\n\
        1,Mine,30,durastahl,25,false\n\
        2,Labor,60,,,true\n";

    #[test]
    fn economy_counts_only_active_buildings_on_owned_planets() {
        let catalog = BuildingCatalog::from_reader(BUILDINGS.as_bytes()).unwrap();
        let store = Store::open_in_memory().unwrap();
        let player = store.create_player("Ada", None).unwrap();
        let other = store.create_player("Bo", None).unwrap();
        let home = store.create_planet(player.id, "Heimat").unwrap();
        let foreign = store.create_planet(other.id, "Fremd").unwrap();

        store.add_building(home.id, 1).unwrap();
        store.add_building(home.id, 1).unwrap();
        store.add_building(home.id, 2).unwrap();
        store.add_building(foreign.id, 1).unwrap();
        {
            let conn = store.connection();
            conn.execute(
                "INSERT INTO buildings (planet_id, building_type_id, is_active) VALUES (?1, 1, 0)",
                [home.id],
            )
            .unwrap();
        }

        let economy = store.player_economy(player.id, &catalog).unwrap();
        assert_eq!(economy.production.get(Resource::Durastahl), 50);
        assert_eq!(economy.lab_count, 1);
    }

    #[test]
    fn missing_player_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.player(99).unwrap().is_none());
    }
}
