//! Resolution of the catalog directory and database shared by every command.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use imperium_lib::{
    resolve_data_dir, BlueprintManager, Catalog, ConstructionManager, ResearchManager, Store,
    TracingSink,
};

/// File name of the database when neither `--database` nor
/// `IMPERIUM_DATABASE` is given.
pub const DEFAULT_DATABASE_FILENAME: &str = "imperium.db";

/// Global options as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn data_dir(&self) -> Result<PathBuf> {
        resolve_data_dir(self.data_dir.as_deref())
            .context("failed to resolve the reference data directory")
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join(DEFAULT_DATABASE_FILENAME)),
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        let dir = self.data_dir()?;
        Catalog::load(&dir)
            .with_context(|| format!("failed to load reference catalogs from {}", dir.display()))
    }

    pub fn open_store(&self) -> Result<Store> {
        let path = self.database_path()?;
        open_store_at(&path)
    }

    /// Open both the catalogs and the database.
    pub fn engine(&self) -> Result<Engine> {
        Ok(Engine {
            catalog: Arc::new(self.load_catalog()?),
            store: Arc::new(self.open_store()?),
        })
    }
}

fn open_store_at(path: &Path) -> Result<Store> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Store::open(path).with_context(|| format!("failed to open database at {}", path.display()))
}

/// Loaded catalogs plus an open store.
pub struct Engine {
    pub catalog: Arc<Catalog>,
    pub store: Arc<Store>,
}

impl Engine {
    pub fn blueprints(&self) -> BlueprintManager {
        BlueprintManager::new(self.store.clone(), self.catalog.clone())
    }

    pub fn research(&self) -> ResearchManager {
        ResearchManager::new(self.store.clone(), self.catalog.clone(), Arc::new(TracingSink))
    }

    pub fn construction(&self) -> ConstructionManager {
        ConstructionManager::new(self.store.clone(), self.catalog.clone(), Arc::new(TracingSink))
    }
}
