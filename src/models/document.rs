//! Saved review documents as stored by the backend.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One row in the saved-documents listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub document_name: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub text_count: Option<u64>,
}

/// A saved document with its stored text items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: String,
    pub document_name: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(deserialize_with = "flexible_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub original_image_path: Option<String>,
    #[serde(default)]
    pub text_items: Vec<StoredTextItem>,
}

/// One text item of a saved document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTextItem {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Region descriptor stored as a JSON string, e.g. `{"cell_id": 3}`.
    #[serde(default)]
    pub text_region: Option<String>,
    #[serde(default, deserialize_with = "int_bool")]
    pub edited: bool,
}

impl StoredTextItem {
    /// Parse the stored region descriptor. Unknown or malformed regions
    /// map to [`TextRegion::Unknown`] rather than failing the whole
    /// document load.
    pub fn region(&self) -> TextRegion {
        let Some(raw) = self.text_region.as_deref() else {
            return TextRegion::Unknown;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return TextRegion::Unknown;
        };
        if let Some(id) = value.get("cell_id").and_then(|v| v.as_i64()) {
            TextRegion::Cell(id)
        } else if let Some(id) = value.get("text_id").and_then(|v| v.as_i64()) {
            TextRegion::UnassignedText(id)
        } else {
            TextRegion::Unknown
        }
    }
}

/// Where a stored text item came from in the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRegion {
    Cell(i64),
    UnassignedText(i64),
    Unknown,
}

impl std::fmt::Display for TextRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cell(id) => write!(f, "Cell #{}", id),
            Self::UnassignedText(id) => write!(f, "Text #{}", id),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The backend writes `created_at` with Python's `datetime.isoformat()`,
/// which omits the UTC offset; accept both naive and offset timestamps,
/// treating naive ones as UTC.
fn flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// The backend stores edited flags as SQLite integers; accept 0/1 as well
/// as JSON booleans.
fn int_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        serde_json::Value::Null => Ok(false),
        other => Err(D::Error::custom(format!(
            "expected bool or integer for edited flag, got {}",
            other
        ))),
    }
}
