//! `scan`: run one construction completion pass.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::context::GlobalOptions;
use crate::output::{emit, render_scan, OutputFormat};

/// Scan at `at`, or now when not given.
pub fn handle_scan(
    options: &GlobalOptions,
    format: OutputFormat,
    at: Option<DateTime<Utc>>,
) -> Result<()> {
    let engine = options.engine()?;
    let now = at.unwrap_or_else(Utc::now);
    let report = engine
        .construction()
        .scan(now)
        .context("construction scan failed")?;
    emit(format, &report, render_scan)
}
