//! Domain types for spools and their usage history.
//!
//! These are the values every [`SpoolStore`](crate::store::SpoolStore)
//! implementation speaks, independent of how a backend persists or
//! transports them.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Result, TrackerError};

pub type SpoolId = i32;
pub type LogId = i32;

/// Filament material. The common names are recognised; anything else is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Material {
    Pla,
    Petg,
    Abs,
    Asa,
    Tpu,
    Nylon,
    Pc,
    Other(String),
}

impl Material {
    pub fn as_str(&self) -> &str {
        match self {
            Material::Pla => "PLA",
            Material::Petg => "PETG",
            Material::Abs => "ABS",
            Material::Asa => "ASA",
            Material::Tpu => "TPU",
            Material::Nylon => "Nylon",
            Material::Pc => "PC",
            Material::Other(name) => name,
        }
    }
}

impl FromStr for Material {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TrackerError::Validation("material is required".to_string()));
        }
        let material = match trimmed.to_ascii_uppercase().as_str() {
            "PLA" => Material::Pla,
            "PETG" => Material::Petg,
            "ABS" => Material::Abs,
            "ASA" => Material::Asa,
            "TPU" => Material::Tpu,
            "NYLON" => Material::Nylon,
            "PC" => Material::Pc,
            _ => Material::Other(trimmed.to_string()),
        };
        Ok(material)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image attached to a spool, with the mime type needed to render it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub mime_type: String,
    pub data: Bytes,
}

impl Photo {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Guess the mime type from a file extension, for photos read off disk.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

/// A stored spool.
///
/// `weight` may go below zero after heavy usage logging; it is stored as-is
/// and [`Spool::is_empty`] is the indicator callers should present.
#[derive(Debug, Clone, PartialEq)]
pub struct Spool {
    pub id: SpoolId,
    pub brand: String,
    pub color: String,
    pub material: Material,
    /// Current weight in grams
    pub weight: f64,
    /// Weight at purchase in grams, never changed afterwards
    pub initial_weight: f64,
    pub cost: f64,
    pub purchase_date: NaiveDate,
    pub photo: Option<Photo>,
}

impl Spool {
    pub fn is_empty(&self) -> bool {
        self.weight <= 0.0
    }

    /// Remaining share of the initial weight, clamped to 0..=100.
    pub fn remaining_percent(&self) -> f64 {
        if self.initial_weight <= 0.0 {
            return 0.0;
        }
        (self.weight / self.initial_weight * 100.0).clamp(0.0, 100.0)
    }
}

/// Input for creating a spool.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpool {
    pub brand: String,
    pub color: String,
    pub material: Material,
    pub weight: f64,
    /// Defaults to `weight` when absent
    pub initial_weight: Option<f64>,
    pub cost: f64,
    pub purchase_date: NaiveDate,
    pub photo: Option<Photo>,
}

impl NewSpool {
    pub fn new(
        brand: impl Into<String>,
        color: impl Into<String>,
        material: Material,
        weight: f64,
        cost: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            brand: brand.into(),
            color: color.into(),
            material,
            weight,
            initial_weight: None,
            cost,
            purchase_date,
            photo: None,
        }
    }

    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn with_initial_weight(mut self, initial_weight: f64) -> Self {
        self.initial_weight = Some(initial_weight);
        self
    }

    pub fn effective_initial_weight(&self) -> f64 {
        self.initial_weight.unwrap_or(self.weight)
    }

    /// Reject the input before anything is written.
    pub fn validate(&self) -> Result<()> {
        require_text("brand", &self.brand)?;
        require_text("color", &self.color)?;
        require_text("material", self.material.as_str())?;
        require_non_negative("weight", self.weight)?;
        require_non_negative("initial weight", self.effective_initial_weight())?;
        require_non_negative("cost", self.cost)?;
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TrackerError::Validation(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// A stored weight may go negative but must be a real number
pub fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() {
        return Err(TrackerError::Validation(format!(
            "weight must be a finite number, got {}",
            weight
        )));
    }
    Ok(())
}

/// What a log entry represents, derived from the sign of its change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    PrintJob,
    Restock,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::PrintJob => f.write_str("Print job"),
            LogKind::Restock => f.write_str("Restock / adjustment"),
        }
    }
}

/// A stored weight change against a spool.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageLog {
    pub id: LogId,
    pub spool_id: SpoolId,
    /// Grams; negative for consumption, positive for restock
    pub change_amount: f64,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
}

impl UsageLog {
    pub fn kind(&self) -> LogKind {
        if self.change_amount < 0.0 {
            LogKind::PrintJob
        } else {
            LogKind::Restock
        }
    }
}

/// Input for appending a log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUsageLog {
    pub spool_id: SpoolId,
    pub change_amount: f64,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
}

impl NewUsageLog {
    pub fn new(spool_id: SpoolId, change_amount: f64, date: DateTime<Utc>) -> Self {
        Self {
            spool_id,
            change_amount,
            date,
            note: None,
        }
    }

    /// A print job consuming `grams` (the sign is applied here).
    pub fn usage(spool_id: SpoolId, grams: f64) -> Self {
        Self::new(spool_id, -grams.abs(), Utc::now())
    }

    /// A restock adding `grams`.
    pub fn restock(spool_id: SpoolId, grams: f64) -> Self {
        Self::new(spool_id, grams.abs(), Utc::now())
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.change_amount.is_finite() || self.change_amount == 0.0 {
            return Err(TrackerError::Validation(format!(
                "change amount must be a non-zero number, got {}",
                self.change_amount
            )));
        }
        Ok(())
    }
}
