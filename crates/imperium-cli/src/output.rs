//! Output formatting for command results.
//!
//! Every command can print either a human-readable text rendering or the
//! serialized JSON of the library type it produced.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use imperium_lib::catalog::ModuleCatalog;
use imperium_lib::{Blueprint, BlueprintReport, QueueEntry, ResearchView, ScanReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text tables.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Print `value` in the requested format, using `render` for text output.
pub fn emit<T, F>(format: OutputFormat, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => print!("{}", render(value)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn render_report(report: &BlueprintReport) -> String {
    let mut out = String::new();
    let stats = &report.stats;
    let costs = &report.costs;
    let _ = writeln!(out, "Class:          {}", report.ship_class);
    let _ = writeln!(out, "Combat rating:  {}", report.combat_rating.as_str());
    let _ = writeln!(out, "Build time:     {} min", report.build_time_minutes);
    let _ = writeln!(out, "Stats:");
    for (label, value) in [
        ("hull", stats.hull),
        ("damage", stats.damage),
        ("shield", stats.shield),
        ("sensor range", stats.sensor_range),
        ("cargo", stats.cargo),
        ("crew", stats.crew),
        ("speed", stats.speed),
        ("hyperdrive", stats.hyperdrive_rating),
        ("consumption", stats.consumption),
    ] {
        let _ = writeln!(out, "  {label:<14} {value:>12.2}");
    }
    let _ = writeln!(out, "Costs:");
    for (label, value) in [
        ("credits", costs.credits),
        ("durastahl", costs.durastahl),
        ("kristallin", costs.kristallin),
        ("tibanna", costs.tibanna),
    ] {
        let _ = writeln!(out, "  {label:<14} {value:>12.2}");
    }
    if report.research.is_valid {
        let _ = writeln!(out, "Research:       ok");
    } else {
        let _ = writeln!(out, "Research:       missing");
        for missing in &report.research.missing {
            let _ = writeln!(out, "  - {missing}");
        }
    }
    out
}

pub fn render_modules(catalog: &ModuleCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available modules ({}):", catalog.len());
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:<12} {:>9} {:>10}  {}",
        "ID", "Name", "Category", "Max level", "Credits", "Research"
    );
    for module in catalog.iter() {
        let research = module
            .required_research
            .as_ref()
            .map(|r| format!("{} (L{})", r.research_id, r.level))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:<12} {:>9} {:>10.0}  {}",
            module.id,
            module.name,
            module.category.as_str(),
            module.max_level,
            module.base_costs.credits,
            research
        );
    }
    out
}

pub fn render_research(views: &[ResearchView]) -> String {
    if views.is_empty() {
        return "No research visible.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<24} {:>5}  {:<12} {:>14} {:>8}",
        "ID", "Name", "Level", "Status", "Progress", "ETA"
    );
    for view in views {
        let eta = view
            .estimated_ticks
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:>5}  {:<12} {:>14} {:>8}",
            view.research_id,
            view.name,
            view.research_level,
            status_label(view),
            format!("{}/{}", view.current_progress, view.max_progress),
            eta
        );
        for blocker in &view.blockers {
            let _ = writeln!(out, "      ! {blocker}");
        }
    }
    out
}

fn status_label(view: &ResearchView) -> &'static str {
    use imperium_lib::ResearchStatus::*;
    match view.status {
        Locked => "locked",
        Available => "available",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

pub fn render_entry(entry: &QueueEntry) -> String {
    let state = match entry.completed_at {
        Some(at) => format!("completed {}", at.to_rfc3339()),
        None => format!("due {}", entry.due_at().to_rfc3339()),
    };
    format!(
        "{} order {}: {} x {} on planet {} ({} min, {})\n",
        entry.kind,
        entry.id,
        entry.quantity,
        entry.target_id,
        entry.planet_id,
        entry.required_build_time_minutes,
        state
    )
}

pub fn render_entries(entries: &[QueueEntry]) -> String {
    if entries.is_empty() {
        return "Construction queue is empty.\n".to_string();
    }
    entries.iter().map(render_entry).collect()
}

pub fn render_blueprints(blueprints: &[Blueprint]) -> String {
    if blueprints.is_empty() {
        return "No blueprints saved.\n".to_string();
    }
    let mut out = String::new();
    for blueprint in blueprints {
        let _ = writeln!(
            out,
            "{:>4}  {:<24} {:<10} {} modules",
            blueprint.id,
            blueprint.name,
            blueprint.ship_class,
            blueprint.modules.len()
        );
    }
    out
}

pub fn render_scan(report: &ScanReport) -> String {
    format!(
        "Scan examined {} entries: completed {}, not due {}, skipped {}, already completed {}, failed {}\n",
        report.examined,
        report.completed,
        report.not_due,
        report.skipped,
        report.already_completed,
        report.failed
    )
}
