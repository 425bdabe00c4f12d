//! Embedded SQLite storage backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::path::Path;

use super::backend::SpoolStore;
use crate::db::{entities::filament, entities::usage_log, init_database};
use crate::error::{Result, TrackerError};
use crate::model::{validate_weight, NewSpool, NewUsageLog, Photo, Spool, SpoolId, UsageLog};

/// How a log append changes the spool's stored weight
#[derive(Debug, Clone, Copy)]
enum WeightUpdate {
    /// Caller already computed the resulting weight
    Absolute(f64),
    /// Add the log's change to whatever is stored
    Delta(f64),
}

/// Spool store backed by a local SQLite file.
///
/// Multi-statement writes run inside a single transaction, so a log row and
/// the weight it implies are never visible apart.
#[derive(Clone)]
pub struct LocalStore {
    db: DatabaseConnection,
}

impl LocalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (or create) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let db = init_database(db_path).await?;
        Ok(Self::new(db))
    }

    /// Insert the log and add its change to the stored weight.
    ///
    /// This is the server-side append: the client's idea of the resulting
    /// weight is not trusted. Returns the new weight.
    pub async fn apply_log_delta(&self, log: NewUsageLog) -> Result<f64> {
        let change = log.change_amount;
        self.write_log(log, WeightUpdate::Delta(change)).await
    }

    async fn write_log(&self, log: NewUsageLog, update: WeightUpdate) -> Result<f64> {
        log.validate()?;
        if let WeightUpdate::Absolute(weight) = update {
            validate_weight(weight)?;
        }

        let txn = self.db.begin().await?;

        // Weight first: takes the write lock before anything is read
        let weight_expr = match update {
            WeightUpdate::Absolute(weight) => Expr::value(weight),
            WeightUpdate::Delta(delta) => Expr::col(filament::Column::Weight).add(delta),
        };
        let updated = filament::Entity::update_many()
            .col_expr(filament::Column::Weight, weight_expr)
            .filter(filament::Column::Id.eq(log.spool_id))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            // Dropping the transaction rolls it back
            return Err(TrackerError::SpoolNotFound(log.spool_id));
        }

        usage_log::ActiveModel {
            filament_id: Set(log.spool_id),
            change_amount: Set(log.change_amount),
            logged_at: Set(log.date.timestamp_millis()),
            note: Set(log.note),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let weight = current_weight(&txn, log.spool_id).await?;
        txn.commit().await?;

        tracing::debug!(
            "Logged {:+}g against spool {}, weight now {}g",
            log.change_amount,
            log.spool_id,
            weight
        );
        Ok(weight)
    }
}

async fn current_weight<C: ConnectionTrait>(conn: &C, id: SpoolId) -> Result<f64> {
    filament::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(|m| m.weight)
        .ok_or(TrackerError::SpoolNotFound(id))
}

fn spool_from_model(model: filament::Model) -> Result<Spool> {
    let purchase_date = NaiveDate::parse_from_str(&model.purchase_date, "%Y-%m-%d").map_err(|e| {
        TrackerError::Decode(format!(
            "spool {} has invalid purchase date '{}': {}",
            model.id, model.purchase_date, e
        ))
    })?;
    let photo = model.photo.map(|data| {
        let mime = model
            .photo_mime
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Photo::new(mime, data)
    });

    Ok(Spool {
        id: model.id,
        material: model.material.parse()?,
        brand: model.brand,
        color: model.color,
        weight: model.weight,
        initial_weight: model.initial_weight,
        cost: model.cost,
        purchase_date,
        photo,
    })
}

fn log_from_model(model: usage_log::Model) -> Result<UsageLog> {
    let date = DateTime::<Utc>::from_timestamp_millis(model.logged_at).ok_or_else(|| {
        TrackerError::Decode(format!(
            "log {} has out-of-range timestamp {}",
            model.id, model.logged_at
        ))
    })?;
    Ok(UsageLog {
        id: model.id,
        spool_id: model.filament_id,
        change_amount: model.change_amount,
        date,
        note: model.note,
    })
}

#[async_trait]
impl SpoolStore for LocalStore {
    async fn list_spools(&self) -> Result<Vec<Spool>> {
        filament::Entity::find()
            .order_by_asc(filament::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(spool_from_model)
            .collect()
    }

    async fn get_spool(&self, id: SpoolId) -> Result<Option<Spool>> {
        filament::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(spool_from_model)
            .transpose()
    }

    async fn add_spool(&self, spool: NewSpool) -> Result<SpoolId> {
        spool.validate()?;

        let initial_weight = spool.effective_initial_weight();
        let (photo, photo_mime) = match spool.photo {
            Some(photo) => (Some(photo.data.to_vec()), Some(photo.mime_type)),
            None => (None, None),
        };

        let model = filament::ActiveModel {
            brand: Set(spool.brand),
            color: Set(spool.color),
            material: Set(spool.material.to_string()),
            weight: Set(spool.weight),
            initial_weight: Set(initial_weight),
            cost: Set(spool.cost),
            purchase_date: Set(spool.purchase_date.format("%Y-%m-%d").to_string()),
            photo: Set(photo),
            photo_mime: Set(photo_mime),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::debug!("Added spool {} ({} {})", model.id, model.brand, model.color);
        Ok(model.id)
    }

    async fn delete_spool(&self, id: SpoolId) -> Result<()> {
        let txn = self.db.begin().await?;
        let logs = usage_log::Entity::delete_many()
            .filter(usage_log::Column::FilamentId.eq(id))
            .exec(&txn)
            .await?;
        let spools = filament::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::debug!(
            "Deleted spool {} ({} row, {} logs)",
            id,
            spools.rows_affected,
            logs.rows_affected
        );
        Ok(())
    }

    async fn list_logs(&self, spool_id: SpoolId) -> Result<Vec<UsageLog>> {
        usage_log::Entity::find()
            .filter(usage_log::Column::FilamentId.eq(spool_id))
            .order_by_desc(usage_log::Column::LoggedAt)
            .order_by_desc(usage_log::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(log_from_model)
            .collect()
    }

    async fn append_log(&self, log: NewUsageLog, resulting_weight: f64) -> Result<()> {
        self.write_log(log, WeightUpdate::Absolute(resulting_weight)).await?;
        Ok(())
    }

    /// Adds the change inside the write transaction, so concurrent callers
    /// never overwrite each other's weight.
    async fn record_change(&self, log: NewUsageLog) -> Result<f64> {
        self.apply_log_delta(log).await
    }

    async fn set_spool_weight(&self, id: SpoolId, weight: f64) -> Result<()> {
        validate_weight(weight)?;
        let result = filament::Entity::update_many()
            .col_expr(filament::Column::Weight, Expr::value(weight))
            .filter(filament::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            tracing::debug!("Weight override for unknown spool {} ignored", id);
        }
        Ok(())
    }
}
