//! Ship classes and their scaling profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipClass {
    Fighter,
    Bomber,
    Corvette,
    Frigate,
    Cruiser,
    Capital,
    Transport,
}

/// Class-wide limits and multipliers applied on top of module contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProfile {
    pub max_slots: usize,
    /// Applied to the summed hull contribution of all modules.
    pub base_hull_multiplier: f64,
    /// Applied to the summed costs (including build time) of all modules.
    pub base_cost_multiplier: f64,
    /// Offensive plus defensive power of a typical design of this class.
    pub combat_baseline: f64,
}

impl ShipClass {
    pub const ALL: [ShipClass; 7] = [
        ShipClass::Fighter,
        ShipClass::Bomber,
        ShipClass::Corvette,
        ShipClass::Frigate,
        ShipClass::Cruiser,
        ShipClass::Capital,
        ShipClass::Transport,
    ];

    pub fn profile(self) -> ClassProfile {
        let (max_slots, base_hull_multiplier, base_cost_multiplier, combat_baseline) = match self
        {
            ShipClass::Fighter => (4, 1.0, 1.0, 60.0),
            ShipClass::Bomber => (5, 1.1, 1.2, 90.0),
            ShipClass::Corvette => (8, 1.3, 1.5, 180.0),
            ShipClass::Frigate => (12, 1.6, 2.0, 320.0),
            ShipClass::Cruiser => (16, 2.0, 2.8, 550.0),
            ShipClass::Capital => (24, 3.0, 4.0, 1000.0),
            ShipClass::Transport => (10, 1.4, 1.3, 120.0),
        };
        ClassProfile {
            max_slots,
            base_hull_multiplier,
            base_cost_multiplier,
            combat_baseline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShipClass::Fighter => "FIGHTER",
            ShipClass::Bomber => "BOMBER",
            ShipClass::Corvette => "CORVETTE",
            ShipClass::Frigate => "FRIGATE",
            ShipClass::Cruiser => "CRUISER",
            ShipClass::Capital => "CAPITAL",
            ShipClass::Transport => "TRANSPORT",
        }
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        ShipClass::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown ship class '{s}'"))
    }
}
