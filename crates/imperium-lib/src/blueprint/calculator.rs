//! Blueprint stat and cost calculation.
//!
//! The calculator is pure: the same class, module list and catalog always
//! produce the same report. Module stats grow geometrically with level
//! (`STAT_MULTIPLIER^(L-1)`) while costs grow polynomially
//! (`L^COST_EXPONENT`), so stacking levels on one module gets expensive fast.

use serde::Serialize;

use crate::catalog::{ModuleCatalog, ModuleCategory, ModuleType, ModuleTypeId};
use crate::constants::{COST_EXPONENT, STAT_MULTIPLIER};
use crate::error::{MissingResearch, ValidationError};
use crate::research::ResearchLevels;
use crate::resources::Costs;

use super::class::ShipClass;
use super::rating::CombatRating;
use super::stats::StatBlock;
use super::{validate_modules, BlueprintModule};

/// Stat multiplier for a module at `level` (level 1 is the base value).
pub fn stat_factor(level: u32) -> f64 {
    STAT_MULTIPLIER.powi(level.saturating_sub(1) as i32)
}

/// Cost multiplier for a module at `level`.
pub fn cost_factor(level: u32) -> f64 {
    f64::from(level).powf(COST_EXPONENT)
}

/// Stats and costs of a single module at the given level, before class scaling.
pub fn module_contribution(module: &ModuleType, level: u32) -> (StatBlock, Costs) {
    (
        module.base_stats.scaled(stat_factor(level)),
        module.base_costs.scaled(cost_factor(level)),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleContribution {
    pub module_type_id: ModuleTypeId,
    pub slot_position: u32,
    pub level: u32,
    pub stats: StatBlock,
    pub costs: Costs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResearchValidation {
    pub is_valid: bool,
    pub missing: Vec<MissingResearch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintReport {
    pub ship_class: ShipClass,
    pub stats: StatBlock,
    pub costs: Costs,
    /// Class-scaled build time rounded up to whole minutes.
    pub build_time_minutes: u32,
    pub combat_rating: CombatRating,
    pub research: ResearchValidation,
    pub modules: Vec<ModuleContribution>,
}

/// Compute aggregate stats, costs and research validity for a module list.
///
/// The module list is structurally validated first; research shortfalls do
/// not fail the calculation and are reported in [`BlueprintReport::research`].
pub fn calculate(
    ship_class: ShipClass,
    modules: &[BlueprintModule],
    catalog: &ModuleCatalog,
    research: &ResearchLevels,
) -> Result<BlueprintReport, ValidationError> {
    validate_modules(ship_class, modules, catalog)?;
    let profile = ship_class.profile();

    let mut stats = StatBlock::default();
    let mut costs = Costs::default();
    let mut contributions = Vec::with_capacity(modules.len());

    for module in modules {
        let module_type =
            catalog
                .get(module.module_type_id)
                .ok_or(ValidationError::UnknownModule {
                    module_type_id: module.module_type_id,
                })?;
        let (module_stats, module_costs) = module_contribution(module_type, module.level);

        stats.hull += module_stats.hull;
        stats.damage += module_stats.damage;
        stats.shield += module_stats.shield;
        stats.sensor_range += module_stats.sensor_range;
        stats.cargo += module_stats.cargo;
        stats.crew += module_stats.crew;
        stats.speed += module_stats.speed;
        stats.consumption += module_stats.consumption;
        // Only one hyperdrive applies: the one added last wins.
        if module_type.category == ModuleCategory::Hyperdrive {
            stats.hyperdrive_rating = module_stats.hyperdrive_rating;
        }
        costs.accumulate(&module_costs);

        contributions.push(ModuleContribution {
            module_type_id: module.module_type_id,
            slot_position: module.slot_position,
            level: module.level,
            stats: module_stats,
            costs: module_costs,
        });
    }

    stats.hull *= profile.base_hull_multiplier;
    let costs = costs.scaled(profile.base_cost_multiplier);
    let build_time_minutes = costs.build_minutes.ceil().max(0.0) as u32;

    Ok(BlueprintReport {
        ship_class,
        stats,
        costs,
        build_time_minutes,
        combat_rating: CombatRating::classify(&stats, ship_class),
        research: validate_research(modules, catalog, research),
        modules: contributions,
    })
}

/// Compare each module's research requirement against the player's levels.
pub fn validate_research(
    modules: &[BlueprintModule],
    catalog: &ModuleCatalog,
    research: &ResearchLevels,
) -> ResearchValidation {
    let missing: Vec<MissingResearch> = modules
        .iter()
        .filter_map(|module| {
            let requirement = catalog.get(module.module_type_id)?.required_research?;
            let current_level = research.level_of(requirement.research_id);
            match current_level {
                Some(level) if level >= requirement.level => None,
                _ => Some(MissingResearch {
                    module_type_id: module.module_type_id,
                    research_id: requirement.research_id,
                    required_level: requirement.level,
                    current_level,
                }),
            }
        })
        .collect();

    ResearchValidation {
        is_valid: missing.is_empty(),
        missing,
    }
}
