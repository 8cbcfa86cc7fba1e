//! Service settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use imperium_lib::catalog::DATA_DIR_ENV;
use imperium_lib::constants::DEFAULT_SCAN_INTERVAL_SECS;
use imperium_lib::store::DATABASE_ENV;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "/data/imperium.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database: PathBuf,
    /// Catalog directory; `None` falls back to the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub port: u16,
    pub scan_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE_PATH),
            data_dir: None,
            port: DEFAULT_PORT,
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
        }
    }
}

impl ServiceConfig {
    /// Read `IMPERIUM_DATABASE`, `IMPERIUM_DATA_DIR`, `SERVICE_PORT` and
    /// `SCAN_INTERVAL_SECS`. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let database = lookup(DATABASE_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.database);
        let data_dir = lookup(DATA_DIR_ENV).map(PathBuf::from);
        let port = lookup("SERVICE_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        // A zero interval would make the scan loop spin.
        let scan_interval = lookup("SCAN_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.scan_interval);

        Self {
            database,
            data_dir,
            port,
            scan_interval,
        }
    }
}
