//! Aggregate ship statistics.

use serde::{Deserialize, Serialize};

/// Stat values contributed by a module or summed over a blueprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hull: f64,
    pub damage: f64,
    pub shield: f64,
    pub sensor_range: f64,
    pub cargo: f64,
    pub crew: f64,
    pub speed: f64,
    pub hyperdrive_rating: f64,
    pub consumption: f64,
}

impl StatBlock {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            hull: self.hull * factor,
            damage: self.damage * factor,
            shield: self.shield * factor,
            sensor_range: self.sensor_range * factor,
            cargo: self.cargo * factor,
            crew: self.crew * factor,
            speed: self.speed * factor,
            hyperdrive_rating: self.hyperdrive_rating * factor,
            consumption: self.consumption * factor,
        }
    }

    pub(crate) fn fields(&self) -> [(f64, &'static str); 9] {
        [
            (self.hull, "hull"),
            (self.damage, "damage"),
            (self.shield, "shield"),
            (self.sensor_range, "sensor_range"),
            (self.cargo, "cargo"),
            (self.crew, "crew"),
            (self.speed, "speed"),
            (self.hyperdrive_rating, "hyperdrive_rating"),
            (self.consumption, "consumption"),
        ]
    }
}
