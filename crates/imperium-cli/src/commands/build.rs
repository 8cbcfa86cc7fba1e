//! `build ship|building|list|cancel`.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ValueEnum;

use imperium_lib::catalog::BuildingTypeId;
use imperium_lib::construction::QueueEntryId;
use imperium_lib::{BlueprintId, PlanetId, PlayerId, QueueKind};

use crate::context::GlobalOptions;
use crate::output::{emit, render_entries, render_entry, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Ship,
    Building,
}

impl From<KindArg> for QueueKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Ship => QueueKind::Ship,
            KindArg::Building => QueueKind::Building,
        }
    }
}

pub fn handle_ship(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    planet: PlanetId,
    blueprint: BlueprintId,
    quantity: u32,
) -> Result<()> {
    let engine = options.engine()?;
    let entry = engine
        .construction()
        .enqueue_ship(player, planet, blueprint, quantity, Utc::now())
        .with_context(|| format!("failed to queue {quantity} ships of blueprint {blueprint}"))?;
    emit(format, &entry, render_entry)
}

pub fn handle_building(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    planet: PlanetId,
    building_type: BuildingTypeId,
    quantity: u32,
) -> Result<()> {
    let engine = options.engine()?;
    let entry = engine
        .construction()
        .enqueue_building(player, planet, building_type, quantity, Utc::now())
        .with_context(|| {
            format!("failed to queue {quantity} buildings of type {building_type}")
        })?;
    emit(format, &entry, render_entry)
}

pub fn handle_list(options: &GlobalOptions, format: OutputFormat, player: PlayerId) -> Result<()> {
    let engine = options.engine()?;
    let entries = engine
        .construction()
        .entries_for_player(player)
        .with_context(|| format!("failed to list construction orders of player {player}"))?;
    emit(format, entries.as_slice(), render_entries)
}

pub fn handle_cancel(
    options: &GlobalOptions,
    format: OutputFormat,
    player: PlayerId,
    kind: KindArg,
    id: QueueEntryId,
) -> Result<()> {
    let engine = options.engine()?;
    let removed = engine
        .construction()
        .cancel_entry(player, kind.into(), id)
        .with_context(|| format!("failed to cancel order {id}"))?;
    emit(format, &removed, |e| format!("Cancelled {}", render_entry(e)))
}
