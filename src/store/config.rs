//! Backend selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{LocalStore, RemoteConfig, RemoteStore, SpoolStore};
use crate::config::db_path_in;
use crate::error::Result;

/// Storage backend type
#[derive(Debug, Clone)]
pub enum StoreType {
    /// Embedded SQLite file
    Local { path: PathBuf },
    /// JSON API of a running server
    Remote(RemoteConfig),
}

impl Default for StoreType {
    fn default() -> Self {
        StoreType::Local {
            path: db_path_in(Path::new("data")),
        }
    }
}

/// Store configuration, resolved once at startup into the store every
/// consumer is handed.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub store_type: StoreType,
}

impl StoreConfig {
    /// Create config for a local database file
    pub fn local(path: PathBuf) -> Self {
        Self {
            store_type: StoreType::Local { path },
        }
    }

    /// Create config for a remote server
    pub fn remote(base_url: impl Into<String>) -> Self {
        Self {
            store_type: StoreType::Remote(RemoteConfig::new(base_url)),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.store_type, StoreType::Remote(_))
    }

    /// Build the backend this config describes
    pub async fn build(&self) -> Result<Arc<dyn SpoolStore>> {
        match &self.store_type {
            StoreType::Local { path } => {
                tracing::debug!("Using local store at {:?}", path);
                Ok(Arc::new(LocalStore::open(path).await?))
            }
            StoreType::Remote(config) => {
                tracing::debug!("Using remote store at {}", config.base_url);
                Ok(Arc::new(RemoteStore::new(config.clone())?))
            }
        }
    }
}
