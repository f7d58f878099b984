//! The shared shape of every portal record.

use chrono::{DateTime, Utc};
use portal_search::Searchable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationErrors;

/// A flat JSON object: one stored, imported or submitted record.
pub type Row = Map<String, Value>;

/// A record held in a page's collection.
pub trait Record: Searchable + Clone + std::fmt::Debug + Serialize + DeserializeOwned {
    /// Storage key prefix (`<ENTITY>_<userId>`)
    const ENTITY: &'static str;
    /// Human-readable singular name, used in notifications
    const LABEL: &'static str;
    /// Prefix of generated ids
    const ID_PREFIX: &'static str;
    /// Zero padding of the numeric id suffix
    const ID_WIDTH: usize;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// A fresh id that no record in `existing` uses.
    fn generate_id(existing: &[Self]) -> String {
        next_id(
            Self::ID_PREFIX,
            Self::ID_WIDTH,
            existing.iter().map(|r| r.id()),
        )
    }

    /// Fill the creation time (if unset) and the update time.
    fn stamp_created(&mut self, now: DateTime<Utc>);

    /// Refresh the last-updated time.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Fill unspecified optional fields of a submitted or imported row.
    fn apply_defaults(row: &mut Row) {
        let _ = row;
    }

    /// Check the record against the rest of its collection.
    ///
    /// `others` may contain the record itself; implementations skip entries
    /// with the same id.
    fn validate(&self, others: &[Self]) -> Result<(), ValidationErrors>;

    /// Reject patch fields a generic field update must not overwrite.
    fn guard_patch(&self, patch: &Row) -> Result<(), ValidationErrors> {
        let _ = patch;
        Ok(())
    }

    /// Dataset shown when storage holds nothing for this entity.
    fn default_dataset(now: DateTime<Utc>) -> Vec<Self>;

    /// Deserialize a normalized row.
    fn from_row(row: Row) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(row))
    }

    /// Serialize to a flat row.
    fn to_row(&self) -> serde_json::Result<Row> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }
}

/// Records carrying the boolean `isActive` status.
pub trait Activatable {
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

/// Next id after the highest numeric suffix among `existing`.
///
/// Ids that do not carry `prefix` followed by digits are ignored, so a
/// deleted id is never handed out again while a higher one survives.
pub fn next_id<'a, I>(prefix: &str, width: usize, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix))
        .filter(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:0width$}", prefix, highest + 1, width = width)
}

/// Whether a row lacks a usable value for `key` (missing, null or blank).
pub fn is_blank(row: &Row, key: &str) -> bool {
    match row.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Stored records without an `isActive` flag load as active.
pub(crate) fn default_active() -> bool {
    true
}

/// Insert `value` under `key` when the row has no usable value.
pub fn fill_default(row: &mut Row, key: &str, value: impl Into<Value>) {
    if is_blank(row, key) {
        row.insert(key.to_string(), value.into());
    }
}

/// Text value of a row field, if it is a non-blank string.
pub fn row_text<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Bring a raw row into the shape records deserialize from.
///
/// Nulls are dropped, numeric ids become strings and blank ids are removed.
pub fn normalize_row(row: &mut Row) {
    row.retain(|_, v| !v.is_null());

    match row.get("id") {
        Some(Value::Number(n)) => {
            let id = n.to_string();
            row.insert("id".to_string(), Value::String(id));
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            row.remove("id");
        }
        _ => {}
    }
}
