use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::macros::format_description;
use time::OffsetDateTime;

/// A schemaless document: a stable identifier plus free-form JSON fields.
///
/// Serializes flat, so a document reads back as one JSON object with its `id`
/// alongside the stored fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String value of a field, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Merge `fields` into this document: present keys overwrite, absent keys
    /// are preserved.
    pub fn merge_from(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// Format a timestamp as a fixed-width RFC 3339 string (second precision).
///
/// Fixed width keeps lexicographic comparison equal to chronological order,
/// which the paginator and the session-expiry check both rely on.
pub fn rfc3339(at: OffsetDateTime) -> anyhow::Result<String> {
    let format =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    Ok(at.format(&format)?)
}

/// Current UTC time in the store's timestamp format.
pub fn now_rfc3339() -> anyhow::Result<String> {
    rfc3339(OffsetDateTime::now_utc())
}
