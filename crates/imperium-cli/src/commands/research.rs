//! `research status|start|cancel|tick`.

use anyhow::{Context, Result};
use chrono::Utc;

use imperium_lib::catalog::ResearchId;
use imperium_lib::PlayerId;

use crate::context::GlobalOptions;
use crate::output::{emit, render_research, OutputFormat};

pub fn handle_status(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
) -> Result<()> {
    let engine = options.engine()?;
    let views = engine
        .research()
        .status(player)
        .with_context(|| format!("failed to resolve research for player {player}"))?;
    emit(format, views.as_slice(), render_research)
}

pub fn handle_start(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    research_id: ResearchId,
) -> Result<()> {
    let engine = options.engine()?;
    let row = engine
        .research()
        .start(player, research_id, Utc::now())
        .with_context(|| format!("failed to start research {research_id}"))?;
    emit(format, &row, |r| {
        format!(
            "Started research {} (0/{})\n",
            r.research_type_id, r.max_progress
        )
    })
}

pub fn handle_cancel(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
) -> Result<()> {
    let engine = options.engine()?;
    let removed = engine
        .research()
        .cancel(player)
        .context("failed to cancel research")?;
    emit(format, &removed, |r| {
        format!(
            "Cancelled research {} at {}/{}\n",
            r.research_type_id, r.current_progress, r.max_progress
        )
    })
}

/// Apply a single research tick, as the game loop would.
pub fn handle_tick(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    points: u64,
) -> Result<()> {
    let engine = options.engine()?;
    let progress = engine
        .research()
        .apply_tick(player, points, Utc::now())
        .with_context(|| format!("failed to apply research tick for player {player}"))?;
    emit(format, &progress, |p| match p {
        Some(row) if row.is_completed() => {
            format!("Research {} completed\n", row.research_type_id)
        }
        Some(row) => format!(
            "Research {} at {}/{}\n",
            row.research_type_id, row.current_progress, row.max_progress
        ),
        None => "No active research.\n".to_string(),
    })
}
