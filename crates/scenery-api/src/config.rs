//! Server configuration
//!
//! Process-wide settings are resolved once at startup and injected into
//! the components that need them; nothing reads the environment after
//! boot.

use scenery_asset::AssetStoreConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the API server process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket the HTTP server binds to
    pub bind: SocketAddr,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory uploads are staged in before publishing
    pub staging_dir: PathBuf,
    /// Object-store credentials, handed to the gateway constructor
    pub asset_store: AssetStoreConfig,
    /// Base URL of the external auth collaborator
    pub auth_url: String,
}

impl ServerConfig {
    /// Create configuration with defaults for the local paths
    #[must_use]
    pub fn new(asset_store: AssetStoreConfig, auth_url: impl Into<String>) -> Self {
        Self {
            bind: ([127, 0, 0, 1], 8080).into(),
            database_path: PathBuf::from("scenery.db"),
            staging_dir: PathBuf::from("uploads"),
            asset_store,
            auth_url: auth_url.into(),
        }
    }

    /// With bind address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// With database path
    #[inline]
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// With staging directory
    #[inline]
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }
}
