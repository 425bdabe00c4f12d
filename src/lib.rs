//! Inventory tracker for 3D-printing filament spools.
//!
//! Spools and their usage history live behind the [`store::SpoolStore`]
//! contract, served either from an embedded SQLite file or from the JSON API
//! that [`api`] exposes.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod model;
pub mod store;
pub mod wire;

pub use error::{Result, TrackerError};
