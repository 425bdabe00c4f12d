//! Storage backends for spools and usage logs.
//!
//! One contract, [`SpoolStore`], with two implementations:
//! - [`LocalStore`]: embedded SQLite file, full transactional semantics
//! - [`RemoteStore`]: the JSON API of a `filament-tracker serve` instance
//!
//! [`StoreConfig`] picks one at startup; callers only ever hold an
//! `Arc<dyn SpoolStore>`.

mod backend;
mod config;
mod local;
mod remote;

pub use backend::SpoolStore;
pub use config::{StoreConfig, StoreType};
pub use local::LocalStore;
pub use remote::{RemoteConfig, RemoteStore};
