//! Database module for SQLite persistence using SeaORM

pub mod entities;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbErr::Custom(format!(
                "cannot create data directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS filaments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            color TEXT NOT NULL,
            material TEXT NOT NULL,
            weight REAL NOT NULL,
            initial_weight REAL NOT NULL,
            cost REAL NOT NULL,
            purchase_date TEXT NOT NULL,
            photo BLOB,
            photo_mime TEXT
        )
        "#.to_string(),
    )).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filament_id INTEGER NOT NULL,
            change_amount REAL NOT NULL,
            logged_at INTEGER NOT NULL,
            note TEXT,
            FOREIGN KEY (filament_id) REFERENCES filaments(id) ON DELETE CASCADE
        )
        "#.to_string(),
    )).await?;

    // Per-spool history lookups
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_logs_filament ON logs(filament_id)"#.to_string(),
    )).await?;

    tracing::info!("Database tables initialized");
    Ok(())
}
