//! Persisted research operations: status, start, cancel and per-tick progress.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, ResearchGate, ResearchId};
use crate::error::{ConflictError, Error, Result};
use crate::notify::{NotificationSink, RESEARCH_COMPLETED};
use crate::store::Store;
use crate::world::PlayerId;

use super::resolver::{check_startable, classify_all, PlayerResearchProgress, ResearchView};
use super::{PlayerResearchState, ResearchLevels};

pub struct ResearchManager {
    store: Arc<Store>,
    catalog: Arc<Catalog>,
    sink: Arc<dyn NotificationSink>,
}

impl ResearchManager {
    pub fn new(store: Arc<Store>, catalog: Arc<Catalog>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            catalog,
            sink,
        }
    }

    pub fn state(&self, player_id: PlayerId) -> Result<PlayerResearchState> {
        self.store.research_state(player_id, &self.catalog.buildings)
    }

    /// Status of every node visible to the player.
    pub fn status(&self, player_id: PlayerId) -> Result<Vec<ResearchView>> {
        let state = self.state(player_id)?;
        Ok(classify_all(&self.catalog.research, &state))
    }

    pub fn levels(&self, player_id: PlayerId) -> Result<ResearchLevels> {
        let state = self.state(player_id)?;
        Ok(state.research_levels(&self.catalog.research))
    }

    /// Start researching `research_id`.
    ///
    /// Availability is recomputed here; a status shown to the player earlier
    /// is not trusted. A concurrent start that slips past the check is still
    /// rejected by the store's single-active index.
    pub fn start(
        &self,
        player_id: PlayerId,
        research_id: ResearchId,
        now: DateTime<Utc>,
    ) -> Result<PlayerResearchProgress> {
        let state = self.state(player_id)?;
        let node = check_startable(&self.catalog.research, research_id, &state)?;
        let row = PlayerResearchProgress::start(player_id, node, now);
        self.store.insert_research_progress(&row)?;
        info!(
            player_id,
            research_id,
            max_progress = row.max_progress,
            "research started"
        );
        Ok(row)
    }

    /// Abandon the player's active research. Progress is discarded.
    pub fn cancel(&self, player_id: PlayerId) -> Result<PlayerResearchProgress> {
        let removed = self
            .store
            .delete_active_research(player_id)?
            .ok_or(ConflictError::NoActiveResearch { player_id })?;
        info!(
            player_id,
            research_id = removed.research_type_id,
            "research cancelled"
        );
        Ok(removed)
    }

    /// Apply one tick to the player's active research.
    ///
    /// Production-gated nodes accrue the player's current production of the
    /// gating resource; point-gated nodes accrue `research_points`. Returns
    /// `None` when nothing is being researched.
    pub fn apply_tick(
        &self,
        player_id: PlayerId,
        research_points: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<PlayerResearchProgress>> {
        let state = self.state(player_id)?;
        let Some(active) = state.active() else {
            debug!(player_id, "no active research to advance");
            return Ok(None);
        };
        let research_id = active.research_type_id;
        let node = self
            .catalog
            .research
            .get(research_id)
            .ok_or(Error::UnknownResearch(research_id))?;

        let amount = match node.gate {
            ResearchGate::Production { resource, .. } => state.economy.production.get(resource),
            ResearchGate::Points { .. } => research_points,
        };

        let Some(advance) = self
            .store
            .advance_research(player_id, research_id, amount, now)?
        else {
            // Cancelled or completed between the read and the update.
            return Ok(None);
        };

        if advance.completed_now {
            info!(player_id, research_id, "research completed");
            let payload = json!({
                "player_id": player_id,
                "research_id": research_id,
                "name": node.name,
                "research_level": node.research_level,
                "unlocks": node.unlocks,
            });
            if let Err(err) = self.sink.publish(player_id, RESEARCH_COMPLETED, &payload) {
                warn!(
                    player_id,
                    research_id,
                    error = %err,
                    "failed to publish research completion"
                );
            }
        }

        Ok(Some(advance.progress))
    }
}
