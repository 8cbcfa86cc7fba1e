//! Per-player research status classification.
//!
//! Classification is recomputed from the player's progress rows and current
//! economy on every call. Starting a node goes through [`check_startable`],
//! which repeats the same checks instead of trusting an earlier status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{
    FactionId, ResearchCatalog, ResearchGate, ResearchId, ResearchType, ResearchUnlocks,
};
use crate::constants::UNREACHABLE_TICKS;
use crate::error::{ConflictError, Error, GatingError, Result};
use crate::resources::Production;
use crate::world::{PlayerEconomy, PlayerId};

use super::ResearchLevels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    Locked,
    Available,
    InProgress,
    Completed,
}

/// One row per (player, research) pair that was ever started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResearchProgress {
    pub player_id: PlayerId,
    pub research_type_id: ResearchId,
    pub current_progress: u64,
    /// Snapshotted from the catalog when the research was started.
    pub max_progress: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlayerResearchProgress {
    /// A fresh progress row with the node's target frozen at start time.
    pub fn start(player_id: PlayerId, node: &ResearchType, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            research_type_id: node.id,
            current_progress: 0,
            max_progress: node.max_progress(),
            started_at: now,
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Everything the resolver needs to know about one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResearchState {
    pub player_id: PlayerId,
    pub faction_id: Option<FactionId>,
    pub economy: PlayerEconomy,
    pub progress: Vec<PlayerResearchProgress>,
}

impl PlayerResearchState {
    pub fn progress_for(&self, research_id: ResearchId) -> Option<&PlayerResearchProgress> {
        self.progress
            .iter()
            .find(|p| p.research_type_id == research_id)
    }

    pub fn active(&self) -> Option<&PlayerResearchProgress> {
        self.progress.iter().find(|p| p.is_active())
    }

    pub fn is_completed(&self, research_id: ResearchId) -> bool {
        self.progress_for(research_id)
            .is_some_and(PlayerResearchProgress::is_completed)
    }

    pub fn completed_ids(&self) -> impl Iterator<Item = ResearchId> + '_ {
        self.progress
            .iter()
            .filter(|p| p.is_completed())
            .map(|p| p.research_type_id)
    }

    pub fn research_levels(&self, catalog: &ResearchCatalog) -> ResearchLevels {
        ResearchLevels::from_completed(catalog, self.completed_ids())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchView {
    pub research_id: ResearchId,
    pub name: String,
    pub research_level: u32,
    pub status: ResearchStatus,
    pub current_progress: u64,
    pub max_progress: u64,
    /// Ticks to finish at current production, production-gated nodes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_ticks: Option<u64>,
    /// Why a locked node is locked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<GatingError>,
    pub unlocks: ResearchUnlocks,
}

/// Classify every node visible to the player's faction.
pub fn classify_all(catalog: &ResearchCatalog, state: &PlayerResearchState) -> Vec<ResearchView> {
    let mut views: Vec<ResearchView> = catalog
        .visible_to(state.faction_id)
        .map(|node| classify(node, state))
        .collect();
    views.sort_by_key(|v| (v.research_level, v.research_id));
    views
}

/// Classify a single node for the player.
pub fn classify(node: &ResearchType, state: &PlayerResearchState) -> ResearchView {
    let progress = state.progress_for(node.id);
    let (status, current_progress, max_progress, blockers) = match progress {
        Some(row) if row.is_completed() => (
            ResearchStatus::Completed,
            row.current_progress,
            row.max_progress,
            Vec::new(),
        ),
        Some(row) => (
            ResearchStatus::InProgress,
            row.current_progress,
            row.max_progress,
            Vec::new(),
        ),
        None => {
            let blockers = gating_blockers(node, state);
            let status = if blockers.is_empty() {
                ResearchStatus::Available
            } else {
                ResearchStatus::Locked
            };
            (status, 0, node.max_progress(), blockers)
        }
    };

    let estimated_ticks = match status {
        ResearchStatus::Completed => None,
        _ => estimated_ticks(
            node,
            &state.economy.production,
            max_progress.saturating_sub(current_progress),
        ),
    };

    ResearchView {
        research_id: node.id,
        name: node.name.clone(),
        research_level: node.research_level,
        status,
        current_progress,
        max_progress,
        estimated_ticks,
        blockers,
        unlocks: node.unlocks.clone(),
    }
}

/// Closed gates for a node that has not been started.
///
/// The prerequisite applies to both progress models; production-gated
/// nodes additionally need the per-tick rate, point-gated nodes the labs.
pub fn gating_blockers(node: &ResearchType, state: &PlayerResearchState) -> Vec<GatingError> {
    let mut blockers = Vec::new();

    if let Some(prerequisite_id) = node.prerequisite_id {
        if !state.is_completed(prerequisite_id) {
            blockers.push(GatingError::PrerequisiteIncomplete {
                research_id: node.id,
                prerequisite_id,
            });
        }
    }

    match node.gate {
        ResearchGate::Production {
            resource, per_tick, ..
        } => {
            let current = state.economy.production.get(resource);
            if current < per_tick {
                blockers.push(GatingError::InsufficientProduction {
                    research_id: node.id,
                    resource,
                    required: per_tick,
                    current,
                });
            }
        }
        ResearchGate::Points {
            required_lab_count,
            ..
        } => {
            if state.economy.lab_count < required_lab_count {
                blockers.push(GatingError::InsufficientLabs {
                    research_id: node.id,
                    required: required_lab_count,
                    available: state.economy.lab_count,
                });
            }
        }
    }

    blockers
}

/// `ceil(remaining / production)` for production-gated nodes.
pub fn estimated_ticks(
    node: &ResearchType,
    production: &Production,
    remaining: u64,
) -> Option<u64> {
    match node.gate {
        ResearchGate::Production { resource, .. } => {
            let rate = production.get(resource);
            if rate == 0 {
                Some(UNREACHABLE_TICKS)
            } else {
                Some(remaining.div_ceil(rate))
            }
        }
        ResearchGate::Points { .. } => None,
    }
}

/// Re-validate that `research_id` may be started by the player right now.
pub fn check_startable<'a>(
    catalog: &'a ResearchCatalog,
    research_id: ResearchId,
    state: &PlayerResearchState,
) -> Result<&'a ResearchType> {
    let node = catalog
        .get(research_id)
        .ok_or(Error::UnknownResearch(research_id))?;

    if !node.is_visible_to(state.faction_id) {
        return Err(GatingError::FactionMismatch {
            research_id,
            faction_id: state.faction_id,
        }
        .into());
    }

    if let Some(row) = state.progress_for(research_id) {
        let conflict = if row.is_completed() {
            ConflictError::ResearchAlreadyCompleted {
                player_id: state.player_id,
                research_id,
            }
        } else {
            ConflictError::ResearchAlreadyStarted {
                player_id: state.player_id,
                research_id,
            }
        };
        return Err(conflict.into());
    }

    if let Some(active) = state.active() {
        return Err(ConflictError::ResearchAlreadyActive {
            player_id: state.player_id,
            active_research_id: active.research_type_id,
        }
        .into());
    }

    if let Some(blocker) = gating_blockers(node, state).into_iter().next() {
        return Err(blocker.into());
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;

    fn node(
        id: ResearchId,
        level: u32,
        prerequisite_id: Option<ResearchId>,
        gate: ResearchGate,
    ) -> ResearchType {
        ResearchType {
            id,
            name: format!("research-{id}"),
            research_level: level,
            faction_id: None,
            prerequisite_id,
            gate,
            unlocks: ResearchUnlocks::default(),
        }
    }

    fn catalog() -> ResearchCatalog {
        ResearchCatalog::from_nodes([
            node(
                1,
                0,
                None,
                ResearchGate::Production {
                    resource: Resource::Durastahl,
                    per_tick: 30,
                    total: 600,
                },
            ),
            node(
                2,
                1,
                Some(1),
                ResearchGate::Points {
                    cost: 100,
                    required_lab_count: 1,
                },
            ),
            node(
                3,
                2,
                Some(2),
                ResearchGate::Points {
                    cost: 250,
                    required_lab_count: 2,
                },
            ),
        ])
        .unwrap()
    }

    fn state(durastahl: u64, labs: u32) -> PlayerResearchState {
        PlayerResearchState {
            player_id: 7,
            faction_id: None,
            economy: PlayerEconomy {
                production: Production::default().with(Resource::Durastahl, durastahl),
                lab_count: labs,
            },
            progress: Vec::new(),
        }
    }

    fn completed(research_type_id: ResearchId) -> PlayerResearchProgress {
        PlayerResearchProgress {
            player_id: 7,
            research_type_id,
            current_progress: 10,
            max_progress: 10,
            started_at: DateTime::UNIX_EPOCH,
            completed_at: Some(DateTime::UNIX_EPOCH),
        }
    }

    #[test]
    fn production_threshold_decides_level_zero_status() {
        let catalog = catalog();
        let node = catalog.get(1).unwrap();

        let view = classify(node, &state(25, 0));
        assert_eq!(view.status, ResearchStatus::Locked);
        assert_eq!(view.estimated_ticks, Some(24));

        let view = classify(node, &state(35, 0));
        assert_eq!(view.status, ResearchStatus::Available);
        assert_eq!(view.estimated_ticks, Some(18));
    }

    #[test]
    fn zero_production_reports_sentinel_ticks() {
        let catalog = catalog();
        let view = classify(catalog.get(1).unwrap(), &state(0, 0));
        assert_eq!(view.estimated_ticks, Some(UNREACHABLE_TICKS));
    }

    #[test]
    fn prerequisite_blocks_regardless_of_labs() {
        let catalog = catalog();
        let view = classify(catalog.get(2).unwrap(), &state(1_000, 50));
        assert_eq!(view.status, ResearchStatus::Locked);
        assert_eq!(
            view.blockers,
            vec![GatingError::PrerequisiteIncomplete {
                research_id: 2,
                prerequisite_id: 1
            }]
        );

        let mut with_prerequisite = state(0, 1);
        with_prerequisite.progress.push(completed(1));
        let view = classify(catalog.get(2).unwrap(), &with_prerequisite);
        assert_eq!(view.status, ResearchStatus::Available);
    }

    #[test]
    fn in_progress_reports_stored_progress_verbatim() {
        let catalog = catalog();
        let mut player = state(0, 0);
        player.progress.push(PlayerResearchProgress {
            player_id: 7,
            research_type_id: 1,
            current_progress: 120,
            max_progress: 500,
            started_at: DateTime::UNIX_EPOCH,
            completed_at: None,
        });
        let view = classify(catalog.get(1).unwrap(), &player);
        assert_eq!(view.status, ResearchStatus::InProgress);
        assert_eq!(view.current_progress, 120);
        assert_eq!(view.max_progress, 500);
    }

    #[test]
    fn starting_with_incomplete_prerequisite_is_gated() {
        let catalog = catalog();
        let mut player = state(0, 5);
        player.progress.push(completed(1));
        let err = check_startable(&catalog, 3, &player).expect_err("node 2 incomplete");
        assert!(matches!(
            err,
            Error::Gating(GatingError::PrerequisiteIncomplete {
                research_id: 3,
                prerequisite_id: 2
            })
        ));
    }

    #[test]
    fn starting_while_another_is_active_conflicts() {
        let catalog = catalog();
        let mut player = state(100, 1);
        player.progress.push(PlayerResearchProgress {
            completed_at: None,
            ..completed(1)
        });
        let err = check_startable(&catalog, 1, &player).expect_err("already started");
        assert!(matches!(
            err,
            Error::Conflict(ConflictError::ResearchAlreadyStarted { .. })
        ));
    }

    #[test]
    fn faction_nodes_are_gated_for_other_factions() {
        let mut imperial = node(
            9,
            1,
            None,
            ResearchGate::Points {
                cost: 10,
                required_lab_count: 0,
            },
        );
        imperial.faction_id = Some(1);
        let catalog = ResearchCatalog::from_nodes([imperial]).unwrap();

        let mut rebel = state(0, 0);
        rebel.faction_id = Some(2);
        assert!(classify_all(&catalog, &rebel).is_empty());
        let err = check_startable(&catalog, 9, &rebel).expect_err("hidden");
        assert!(matches!(
            err,
            Error::Gating(GatingError::FactionMismatch { .. })
        ));

        rebel.faction_id = Some(1);
        assert_eq!(classify_all(&catalog, &rebel).len(), 1);
        assert!(check_startable(&catalog, 9, &rebel).is_ok());
    }
}
