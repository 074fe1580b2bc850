use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque, schema-tagged document belonging to exactly one collection.
///
/// The server never interprets resource-specific fields; they pass through
/// as-is. Only `id` is typed: it is assigned server-side at creation and is
/// never regenerated by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Record {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: String) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Decodes a record from a raw JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Serializes the record back into a flat JSON document.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Forces the record id, discarding any client-supplied value.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }
}
