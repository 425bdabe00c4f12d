//! JSON transfer encoding between the server and the remote backend.
//!
//! Photos travel as data URLs (`data:<mime>;base64,<payload>`), timestamps
//! as RFC 3339 strings and purchase dates as `YYYY-MM-DD`. Anything that
//! fails to decode is reported as [`TrackerError::Decode`]; nothing is
//! patched up on a best-effort basis.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::model::{LogId, NewSpool, NewUsageLog, Photo, Spool, SpoolId, UsageLog};

/// Spool as sent over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpoolId>,
    pub brand: String,
    pub color: String,
    pub material: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_weight: Option<f64>,
    pub cost: f64,
    pub purchase_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Usage log as sent over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LogId>,
    pub filament_id: SpoolId,
    pub change_amount: f64,
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: SpoolId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub fn encode_photo(photo: &Photo) -> String {
    format!("data:{};base64,{}", photo.mime_type, BASE64.encode(&photo.data))
}

pub fn decode_photo(data_url: &str) -> Result<Photo> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| TrackerError::Decode("photo is not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| TrackerError::Decode("photo data URL has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| TrackerError::Decode("photo data URL is not base64 encoded".to_string()))?;
    let mime_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    let data = BASE64
        .decode(payload)
        .map_err(|e| TrackerError::Decode(format!("invalid photo payload: {}", e)))?;
    Ok(Photo::new(mime_type, data))
}

pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TrackerError::Decode(format!("invalid timestamp '{}': {}", s, e)))
}

pub fn encode_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Accepts a plain date or a full timestamp (browsers send the latter).
pub fn decode_date(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    decode_timestamp(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| TrackerError::Decode(format!("invalid date '{}'", s)))
}

impl From<&Spool> for ApiSpool {
    fn from(spool: &Spool) -> Self {
        Self {
            id: Some(spool.id),
            brand: spool.brand.clone(),
            color: spool.color.clone(),
            material: spool.material.to_string(),
            weight: spool.weight,
            initial_weight: Some(spool.initial_weight),
            cost: spool.cost,
            purchase_date: encode_date(&spool.purchase_date),
            photo: spool.photo.as_ref().map(encode_photo),
        }
    }
}

impl From<&NewSpool> for ApiSpool {
    fn from(spool: &NewSpool) -> Self {
        Self {
            id: None,
            brand: spool.brand.clone(),
            color: spool.color.clone(),
            material: spool.material.to_string(),
            weight: spool.weight,
            initial_weight: spool.initial_weight,
            cost: spool.cost,
            purchase_date: encode_date(&spool.purchase_date),
            photo: spool.photo.as_ref().map(encode_photo),
        }
    }
}

impl TryFrom<ApiSpool> for NewSpool {
    type Error = TrackerError;

    fn try_from(api: ApiSpool) -> Result<Self> {
        Ok(Self {
            material: api.material.parse()?,
            purchase_date: decode_date(&api.purchase_date)?,
            photo: api.photo.as_deref().map(decode_photo).transpose()?,
            brand: api.brand,
            color: api.color,
            weight: api.weight,
            initial_weight: api.initial_weight,
            cost: api.cost,
        })
    }
}

impl TryFrom<ApiSpool> for Spool {
    type Error = TrackerError;

    fn try_from(api: ApiSpool) -> Result<Self> {
        let id = api
            .id
            .ok_or_else(|| TrackerError::Decode("spool without id".to_string()))?;
        Ok(Self {
            id,
            material: api.material.parse()?,
            purchase_date: decode_date(&api.purchase_date)?,
            photo: api.photo.as_deref().map(decode_photo).transpose()?,
            initial_weight: api.initial_weight.unwrap_or(api.weight),
            brand: api.brand,
            color: api.color,
            weight: api.weight,
            cost: api.cost,
        })
    }
}

impl From<&UsageLog> for ApiLog {
    fn from(log: &UsageLog) -> Self {
        Self {
            id: Some(log.id),
            filament_id: log.spool_id,
            change_amount: log.change_amount,
            date: encode_timestamp(&log.date),
            note: log.note.clone(),
        }
    }
}

impl From<&NewUsageLog> for ApiLog {
    fn from(log: &NewUsageLog) -> Self {
        Self {
            id: None,
            filament_id: log.spool_id,
            change_amount: log.change_amount,
            date: encode_timestamp(&log.date),
            note: log.note.clone(),
        }
    }
}

impl TryFrom<ApiLog> for NewUsageLog {
    type Error = TrackerError;

    fn try_from(api: ApiLog) -> Result<Self> {
        Ok(Self {
            spool_id: api.filament_id,
            change_amount: api.change_amount,
            date: decode_timestamp(&api.date)?,
            note: api.note,
        })
    }
}

impl TryFrom<ApiLog> for UsageLog {
    type Error = TrackerError;

    fn try_from(api: ApiLog) -> Result<Self> {
        let id = api
            .id
            .ok_or_else(|| TrackerError::Decode("log without id".to_string()))?;
        Ok(Self {
            id,
            spool_id: api.filament_id,
            change_amount: api.change_amount,
            date: decode_timestamp(&api.date)?,
            note: api.note,
        })
    }
}
