//! Player-authored ship designs and the stat/cost calculator.
//!
//! - [`class`] - ship classes with slot limits and scaling multipliers
//! - [`stats`] - the aggregate stat block
//! - [`calculator`] - per-module scaling, aggregation and research validation
//! - [`rating`] - combat rating tiers
//! - [`manager`] - persisted blueprints owned by players
//!
//! # Example
//!
//! ```no_run
//! use imperium_lib::blueprint::{calculate, BlueprintModule, ShipClass};
//! use imperium_lib::catalog::ModuleCatalog;
//! use imperium_lib::research::ResearchLevels;
//!
//! let catalog = ModuleCatalog::from_path(std::path::Path::new("modules.csv")).unwrap();
//! let modules = [BlueprintModule { module_type_id: 1, level: 2, slot_position: 0 }];
//! let levels = ResearchLevels::default();
//! let report = calculate(ShipClass::Fighter, &modules, &catalog, &levels).unwrap();
//! println!("{} credits, {} minutes", report.costs.credits, report.build_time_minutes);
//! ```

pub mod calculator;
pub mod class;
pub mod manager;
pub mod rating;
pub mod stats;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ModuleCatalog, ModuleTypeId};
use crate::error::ValidationError;
use crate::world::PlayerId;

pub use calculator::{
    calculate, cost_factor, module_contribution, stat_factor, validate_research, BlueprintReport,
    ModuleContribution, ResearchValidation,
};
pub use class::{ClassProfile, ShipClass};
pub use manager::BlueprintManager;
pub use rating::{combat_power, CombatRating};
pub use stats::StatBlock;

pub type BlueprintId = i64;

/// One module placed in a blueprint slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintModule {
    pub module_type_id: ModuleTypeId,
    pub level: u32,
    pub slot_position: u32,
}

/// A design as submitted by a player, before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDraft {
    pub name: String,
    pub ship_class: ShipClass,
    /// Modules in the order they were added.
    #[serde(default)]
    pub modules: Vec<BlueprintModule>,
}

impl BlueprintDraft {
    pub fn new(name: impl Into<String>, ship_class: ShipClass) -> Self {
        Self {
            name: name.into(),
            ship_class,
            modules: Vec::new(),
        }
    }

    /// Append a module, rejecting it if the class is full or the slot is taken.
    pub fn add_module(&mut self, module: BlueprintModule) -> Result<(), ValidationError> {
        let max_slots = self.ship_class.profile().max_slots;
        if self.modules.len() >= max_slots {
            return Err(ValidationError::TooManyModules {
                count: self.modules.len() + 1,
                max_slots,
            });
        }
        if self
            .modules
            .iter()
            .any(|m| m.slot_position == module.slot_position)
        {
            return Err(ValidationError::DuplicateSlot {
                slot: module.slot_position,
            });
        }
        self.modules.push(module);
        Ok(())
    }

    /// Full save-time validation against the module catalog.
    pub fn validate(&self, catalog: &ModuleCatalog) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        validate_modules(self.ship_class, &self.modules, catalog)
    }
}

/// A persisted blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub player_id: PlayerId,
    pub name: String,
    pub ship_class: ShipClass,
    pub modules: Vec<BlueprintModule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Check slot uniqueness, slot range, slot count and module levels.
pub fn validate_modules(
    ship_class: ShipClass,
    modules: &[BlueprintModule],
    catalog: &ModuleCatalog,
) -> Result<(), ValidationError> {
    let max_slots = ship_class.profile().max_slots;
    if modules.len() > max_slots {
        return Err(ValidationError::TooManyModules {
            count: modules.len(),
            max_slots,
        });
    }

    let mut used = HashSet::with_capacity(modules.len());
    for module in modules {
        if module.slot_position as usize >= max_slots {
            return Err(ValidationError::SlotOutOfRange {
                slot: module.slot_position,
                max_slots,
            });
        }
        if !used.insert(module.slot_position) {
            return Err(ValidationError::DuplicateSlot {
                slot: module.slot_position,
            });
        }

        let module_type =
            catalog
                .get(module.module_type_id)
                .ok_or(ValidationError::UnknownModule {
                    module_type_id: module.module_type_id,
                })?;
        if module.level == 0 {
            return Err(ValidationError::ZeroLevel {
                module_type_id: module.module_type_id,
            });
        }
        if module.level > module_type.max_level {
            return Err(ValidationError::LevelExceedsMax {
                module_type_id: module.module_type_id,
                level: module.level,
                max_level: module_type.max_level,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModuleCategory, ModuleType};
    use crate::resources::Costs;

    fn catalog() -> ModuleCatalog {
        ModuleCatalog::from_modules([ModuleType {
            id: 1,
            name: "Panzerplatte".to_string(),
            category: ModuleCategory::Hull,
            max_level: 3,
            base_stats: StatBlock {
                hull: 50.0,
                ..StatBlock::default()
            },
            base_costs: Costs {
                credits: 80.0,
                build_minutes: 4.0,
                ..Costs::default()
            },
            required_research: None,
        }])
        .unwrap()
    }

    fn module(slot: u32, level: u32) -> BlueprintModule {
        BlueprintModule {
            module_type_id: 1,
            level,
            slot_position: slot,
        }
    }

    #[test]
    fn adding_beyond_class_maximum_is_rejected() {
        let mut draft = BlueprintDraft::new("Jaeger", ShipClass::Fighter);
        for slot in 0..4 {
            draft.add_module(module(slot, 1)).expect("slot free");
        }
        let err = draft.add_module(module(4, 1)).expect_err("fighter is full");
        assert_eq!(
            err,
            ValidationError::TooManyModules {
                count: 5,
                max_slots: 4
            }
        );
        assert_eq!(draft.modules.len(), 4);
    }

    #[test]
    fn duplicate_slot_is_rejected() {
        let draft = BlueprintDraft {
            name: "Doppelt".to_string(),
            ship_class: ShipClass::Fighter,
            modules: vec![module(1, 1), module(1, 2)],
        };
        assert_eq!(
            draft.validate(&catalog()),
            Err(ValidationError::DuplicateSlot { slot: 1 })
        );
    }

    #[test]
    fn level_above_max_is_rejected() {
        let draft = BlueprintDraft {
            name: "Zu hoch".to_string(),
            ship_class: ShipClass::Fighter,
            modules: vec![module(0, 4)],
        };
        assert_eq!(
            draft.validate(&catalog()),
            Err(ValidationError::LevelExceedsMax {
                module_type_id: 1,
                level: 4,
                max_level: 3
            })
        );
    }

    #[test]
    fn slot_outside_class_range_is_rejected() {
        let draft = BlueprintDraft {
            name: "Weit".to_string(),
            ship_class: ShipClass::Fighter,
            modules: vec![module(7, 1)],
        };
        assert!(matches!(
            draft.validate(&catalog()),
            Err(ValidationError::SlotOutOfRange { slot: 7, .. })
        ));
    }

    #[test]
    fn empty_name_is_rejected() {
        let draft = BlueprintDraft::new("  ", ShipClass::Bomber);
        assert_eq!(draft.validate(&catalog()), Err(ValidationError::EmptyName));
    }

    #[test]
    fn oversized_module_list_is_rejected_without_truncation() {
        let draft = BlueprintDraft {
            name: "Voll".to_string(),
            ship_class: ShipClass::Fighter,
            modules: (0..5).map(|slot| module(slot, 1)).collect(),
        };
        assert_eq!(
            draft.validate(&catalog()),
            Err(ValidationError::TooManyModules {
                count: 5,
                max_slots: 4
            })
        );
    }
}
