//! Research dependency resolution and progress.
//!
//! - [`resolver`] - pure status classification and start checks
//! - [`progress`] - persisted start/cancel/tick operations
//!
//! [`ResearchLevels`] condenses a player's completed research into the
//! "level reached per node" view that module requirements are checked against.

pub mod progress;
pub mod resolver;

use std::collections::HashMap;

use crate::catalog::{ResearchCatalog, ResearchId};

pub use progress::ResearchManager;
pub use resolver::{
    check_startable, classify, classify_all, estimated_ticks, gating_blockers,
    PlayerResearchProgress, PlayerResearchState, ResearchStatus, ResearchView,
};

/// Highest research level a player has reached along each node's chain.
///
/// Completing a node counts as reaching its `research_level` on the node
/// itself and on every ancestor in its prerequisite chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResearchLevels {
    levels: HashMap<ResearchId, u32>,
}

impl ResearchLevels {
    pub fn from_completed(
        catalog: &ResearchCatalog,
        completed: impl IntoIterator<Item = ResearchId>,
    ) -> Self {
        let mut levels = Self::default();
        for id in completed {
            let Some(node) = catalog.get(id) else {
                continue;
            };
            for ancestor in catalog.chain(id) {
                levels.raise(ancestor.id, node.research_level);
            }
        }
        levels
    }

    pub fn from_levels(levels: impl IntoIterator<Item = (ResearchId, u32)>) -> Self {
        let mut result = Self::default();
        for (id, level) in levels {
            result.raise(id, level);
        }
        result
    }

    /// `None` when the node has not been researched at all.
    pub fn level_of(&self, id: ResearchId) -> Option<u32> {
        self.levels.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn raise(&mut self, id: ResearchId, level: u32) {
        self.levels
            .entry(id)
            .and_modify(|current| *current = (*current).max(level))
            .or_insert(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ResearchGate, ResearchType, ResearchUnlocks};
    use crate::resources::Resource;

    fn tree() -> ResearchCatalog {
        let node = |id, level, prerequisite_id| ResearchType {
            id,
            name: format!("r{id}"),
            research_level: level,
            faction_id: None,
            prerequisite_id,
            gate: if level == 0 {
                ResearchGate::Production {
                    resource: Resource::Durastahl,
                    per_tick: 1,
                    total: 1,
                }
            } else {
                ResearchGate::Points {
                    cost: 1,
                    required_lab_count: 0,
                }
            },
            unlocks: ResearchUnlocks::default(),
        };
        ResearchCatalog::from_nodes([node(1, 0, None), node(2, 1, Some(1)), node(3, 2, Some(2))])
            .unwrap()
    }

    #[test]
    fn completed_node_raises_its_whole_chain() {
        let levels = ResearchLevels::from_completed(&tree(), [1, 2, 3]);
        assert_eq!(levels.level_of(3), Some(2));
        assert_eq!(levels.level_of(2), Some(2));
        assert_eq!(levels.level_of(1), Some(2));
    }

    #[test]
    fn unresearched_nodes_have_no_level() {
        let levels = ResearchLevels::from_completed(&tree(), [1]);
        assert_eq!(levels.level_of(1), Some(0));
        assert_eq!(levels.level_of(2), None);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let levels = ResearchLevels::from_completed(&tree(), [42]);
        assert!(levels.is_empty());
    }
}
