//! Database entities

pub mod filament;
pub mod usage_log;
