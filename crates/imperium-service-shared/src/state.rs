//! Shared state behind every handler.

use std::sync::Arc;

use imperium_lib::{
    resolve_data_dir, BlueprintManager, Catalog, ConstructionManager, Error as LibError,
    NotificationSink, ResearchManager, Store, TracingSink,
};

use crate::ServiceConfig;

#[derive(Debug)]
pub enum AppStateError {
    DataDir(LibError),
    CatalogLoad(LibError),
    StoreOpen(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataDir(e) => write!(f, "failed to resolve data directory: {e}"),
            Self::CatalogLoad(e) => write!(f, "failed to load reference catalogs: {e}"),
            Self::StoreOpen(e) => write!(f, "failed to open database: {e}"),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataDir(e) | Self::CatalogLoad(e) | Self::StoreOpen(e) => Some(e),
        }
    }
}

/// Catalogs, store and managers, cheap to clone.
///
/// ```ignore
/// let state = AppState::load(&ServiceConfig::from_env())?;
/// let app = Router::new()
///     .route("/health/ready", get(health_ready))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<Store>,
    catalog: Arc<Catalog>,
    blueprints: BlueprintManager,
    research: ResearchManager,
    construction: ConstructionManager,
}

impl AppState {
    /// Load catalogs from the configured data directory and open the database.
    /// Completion events are logged through [`TracingSink`].
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let data_dir =
            resolve_data_dir(config.data_dir.as_deref()).map_err(AppStateError::DataDir)?;
        tracing::info!(path = %data_dir.display(), "loading reference catalogs");
        let catalog = Catalog::load(&data_dir).map_err(AppStateError::CatalogLoad)?;

        tracing::info!(path = %config.database.display(), "opening database");
        let store = Store::open(&config.database).map_err(AppStateError::StoreOpen)?;

        Ok(Self::from_components(store, catalog, Arc::new(TracingSink)))
    }

    pub fn from_components(
        store: Store,
        catalog: Catalog,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let store = Arc::new(store);
        let catalog = Arc::new(catalog);
        Self {
            inner: Arc::new(AppStateInner {
                blueprints: BlueprintManager::new(store.clone(), catalog.clone()),
                research: ResearchManager::new(store.clone(), catalog.clone(), sink.clone()),
                construction: ConstructionManager::new(store.clone(), catalog.clone(), sink),
                store,
                catalog,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn blueprints(&self) -> &BlueprintManager {
        &self.inner.blueprints
    }

    pub fn research(&self) -> &ResearchManager {
        &self.inner.research
    }

    pub fn construction(&self) -> &ConstructionManager {
        &self.inner.construction
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.inner.store)
            .field("modules", &self.inner.catalog.modules.len())
            .field("research", &self.inner.catalog.research.len())
            .field("buildings", &self.inner.catalog.buildings.len())
            .finish()
    }
}
