//! Read-only reference data: modules, research nodes and building types.
//!
//! - [`modules`] - ship module definitions used by the blueprint calculator
//! - [`research`] - the research tree used by the resolver
//! - [`buildings`] - building types used by the construction queue and to
//!   derive player production
//!
//! All three are loaded from CSV files in a data directory. [`Catalog`]
//! bundles them so callers can share one `Arc<Catalog>`.

pub mod buildings;
pub mod modules;
pub mod research;

use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

pub use buildings::{BuildingCatalog, BuildingOutput, BuildingType, BuildingTypeId};
pub use modules::{ModuleCatalog, ModuleCategory, ModuleType, ModuleTypeId, ResearchRequirement};
pub use research::{
    FactionId, ResearchBonus, ResearchCatalog, ResearchGate, ResearchId, ResearchType,
    ResearchUnlocks,
};

pub const MODULES_FILENAME: &str = "modules.csv";
pub const RESEARCH_FILENAME: &str = "research.csv";
pub const BUILDINGS_FILENAME: &str = "buildings.csv";

/// Environment variable overriding the reference data directory.
pub const DATA_DIR_ENV: &str = "IMPERIUM_DATA_DIR";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub modules: ModuleCatalog,
    pub research: ResearchCatalog,
    pub buildings: BuildingCatalog,
}

impl Catalog {
    /// Load all three catalog files from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        debug!(path = %dir.display(), "loading reference catalogs");
        let catalog = Self::from_parts(
            ModuleCatalog::from_path(&dir.join(MODULES_FILENAME))?,
            ResearchCatalog::from_path(&dir.join(RESEARCH_FILENAME))?,
            BuildingCatalog::from_path(&dir.join(BUILDINGS_FILENAME))?,
        )?;
        debug!(
            modules = catalog.modules.len(),
            research = catalog.research.len(),
            buildings = catalog.buildings.len(),
            "reference catalogs loaded"
        );
        Ok(catalog)
    }

    /// Bundle already parsed catalogs, checking references between them.
    ///
    /// Every module's required research must name a node in the research
    /// catalog.
    pub fn from_parts(
        modules: ModuleCatalog,
        research: ResearchCatalog,
        buildings: BuildingCatalog,
    ) -> Result<Self> {
        for module in modules.iter() {
            let Some(requirement) = &module.required_research else {
                continue;
            };
            if research.get(requirement.research_id).is_none() {
                return Err(Error::CatalogValidation {
                    catalog: MODULES_FILENAME,
                    message: format!(
                        "module {} requires unknown research {}",
                        module.id, requirement.research_id
                    ),
                });
            }
        }
        Ok(Self {
            modules,
            research,
            buildings,
        })
    }
}

/// Resolve the default data directory using platform-specific project directories.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("com", "imperium", "imperium").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Resolve the data directory.
///
/// Order of precedence:
/// 1. The explicit path, when given.
/// 2. The `IMPERIUM_DATA_DIR` environment variable.
/// 3. The platform data directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(path));
    }
    default_data_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/imperium"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/imperium"));
    }

    #[test]
    fn load_reports_missing_files() {
        let temp = tempfile::tempdir().unwrap();
        let err = Catalog::load(temp.path()).expect_err("no files");
        assert!(matches!(err, Error::CatalogNotFound { .. }));
    }
}
