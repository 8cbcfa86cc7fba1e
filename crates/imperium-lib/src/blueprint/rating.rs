//! Combat rating tiers relative to a ship class baseline.

use serde::{Deserialize, Serialize};

use super::class::ShipClass;
use super::stats::StatBlock;

const DAMAGE_WEIGHT: f64 = 2.0;
const SHIELD_WEIGHT: f64 = 1.0;
const HULL_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatRating {
    Niedrig,
    Mittel,
    Hoch,
    SehrHoch,
}

impl CombatRating {
    /// Classify a design by its weighted power over the class baseline.
    pub fn classify(stats: &StatBlock, class: ShipClass) -> Self {
        let ratio = combat_power(stats) / class.profile().combat_baseline;
        if ratio < 0.75 {
            CombatRating::Niedrig
        } else if ratio < 1.5 {
            CombatRating::Mittel
        } else if ratio < 2.5 {
            CombatRating::Hoch
        } else {
            CombatRating::SehrHoch
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CombatRating::Niedrig => "NIEDRIG",
            CombatRating::Mittel => "MITTEL",
            CombatRating::Hoch => "HOCH",
            CombatRating::SehrHoch => "SEHR_HOCH",
        }
    }
}

/// Weighted offensive plus defensive power.
pub fn combat_power(stats: &StatBlock) -> f64 {
    stats.damage * DAMAGE_WEIGHT + stats.shield * SHIELD_WEIGHT + stats.hull * HULL_WEIGHT
}
