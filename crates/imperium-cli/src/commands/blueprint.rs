//! `blueprint save|list|delete`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use imperium_lib::{BlueprintId, PlayerId};

use crate::commands::calc::read_draft;
use crate::context::GlobalOptions;
use crate::output::{emit, render_blueprints, OutputFormat};

pub fn handle_save(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    path: &Path,
) -> Result<()> {
    let draft = read_draft(path)?;
    let engine = options.engine()?;
    let saved = engine
        .blueprints()
        .create(player, &draft, Utc::now())
        .with_context(|| format!("failed to save blueprint '{}'", draft.name))?;
    emit(format, &saved, |b| {
        format!("Saved blueprint {} ({})\n", b.id, b.name)
    })
}

pub fn handle_list(options: &GlobalOptions, format: OutputFormat, player: PlayerId) -> Result<()> {
    let engine = options.engine()?;
    let blueprints = engine
        .blueprints()
        .list(player)
        .with_context(|| format!("failed to list blueprints of player {player}"))?;
    emit(format, blueprints.as_slice(), render_blueprints)
}

pub fn handle_delete(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    id: BlueprintId,
) -> Result<()> {
    let engine = options.engine()?;
    engine
        .blueprints()
        .delete(player, id)
        .with_context(|| format!("failed to delete blueprint {id}"))?;
    emit(format, &serde_json::json!({ "deleted": id }), |_| {
        format!("Deleted blueprint {id}\n")
    })
}
