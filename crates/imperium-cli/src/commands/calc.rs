//! `calc`: compute stats and costs for a blueprint JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use imperium_lib::{calculate, BlueprintDraft, PlayerId, ResearchLevels};

use crate::context::GlobalOptions;
use crate::output::{emit, render_report, OutputFormat};

/// Read a [`BlueprintDraft`] from `path`.
pub fn read_draft(path: &Path) -> Result<BlueprintDraft> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read blueprint from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse blueprint JSON in {}", path.display()))
}

/// Without a player the design is validated against an empty research state,
/// so every module with a research requirement is reported as missing.
pub fn handle_calc(
    options: &GlobalOptions,
    format: OutputFormat,
    path: &Path,
    player: Option<PlayerId>,
) -> Result<()> {
    let draft = read_draft(path)?;
    let report = match player {
        Some(player_id) => {
            let engine = options.engine()?;
            engine
                .blueprints()
                .preview(player_id, draft.ship_class, &draft.modules)
                .with_context(|| format!("failed to calculate '{}'", draft.name))?
        }
        None => {
            let catalog = options.load_catalog()?;
            calculate(
                draft.ship_class,
                &draft.modules,
                &catalog.modules,
                &ResearchLevels::default(),
            )
            .with_context(|| format!("failed to calculate '{}'", draft.name))?
        }
    };
    emit(format, &report, render_report)
}
