#![allow(dead_code)]
use std::sync::Arc;

use filament_tracker::api::{self, AppState};
use filament_tracker::store::{LocalStore, RemoteConfig, RemoteStore, SpoolStore};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// API server on an ephemeral port, backed by a throwaway database
pub struct TestServer {
    pub base_url: String,
    _temp_dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(&temp_dir.path().join("filament.db"))
            .await
            .unwrap();
        let state = Arc::new(AppState::new(store));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            api::serve(listener, state).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            _temp_dir: temp_dir,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A store plus whatever keeps it alive
pub enum Harness {
    Local {
        store: Arc<LocalStore>,
        _temp_dir: TempDir,
    },
    Remote {
        store: Arc<RemoteStore>,
        _server: TestServer,
    },
}

impl Harness {
    pub async fn local() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(&temp_dir.path().join("filament.db"))
            .await
            .unwrap();
        Harness::Local {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        }
    }

    pub async fn remote() -> Self {
        let server = TestServer::spawn().await;
        let store = RemoteStore::new(RemoteConfig::new(server.base_url.clone())).unwrap();
        Harness::Remote {
            store: Arc::new(store),
            _server: server,
        }
    }

    /// Owned handle for moving into spawned tasks
    pub fn shared(&self) -> Arc<dyn SpoolStore> {
        match self {
            Harness::Local { store, .. } => store.clone() as Arc<dyn SpoolStore>,
            Harness::Remote { store, .. } => store.clone() as Arc<dyn SpoolStore>,
        }
    }

    pub fn store(&self) -> &dyn SpoolStore {
        match self {
            Harness::Local { store, .. } => &**store,
            Harness::Remote { store, .. } => &**store,
        }
    }
}
