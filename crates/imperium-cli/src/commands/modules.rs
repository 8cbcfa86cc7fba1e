//! `modules`: list the module catalog.

use anyhow::Result;

use crate::context::GlobalOptions;
use crate::output::{emit, render_modules, OutputFormat};

pub fn handle_list_modules(options: &GlobalOptions, format: OutputFormat) -> Result<()> {
    let catalog = options.load_catalog()?;
    let modules: Vec<_> = catalog.modules.iter().collect();
    emit(format, modules.as_slice(), |_| render_modules(&catalog.modules))
}
