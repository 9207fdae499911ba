//! Documents
//!
//! A document is a JSON object with a string `_id`. The id doubles as the
//! collection key, so `fields["_id"]` and `id` always agree.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{NestError, Result};
use crate::query;

/// Field holding the document identity
pub const ID_FIELD: &str = "_id";

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    fields: Map<String, Value>,
}

impl Document {
    /// Build a document from an insert payload
    ///
    /// The payload must be a JSON object. Without an `_id`, a fresh one from
    /// [`generate_id`] is assigned.
    pub fn new(payload: Value) -> Result<Self> {
        let mut fields = match payload {
            Value::Object(fields) => fields,
            other => {
                return Err(NestError::Parse(format!(
                    "document must be a JSON object, got {}",
                    kind_name(&other)
                )))
            }
        };

        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::String(_)) => {
                return Err(NestError::Parse(format!("{ID_FIELD} cannot be empty")))
            }
            Some(other) => {
                return Err(NestError::Parse(format!(
                    "{ID_FIELD} must be a string, got {}",
                    kind_name(other)
                )))
            }
            None => {
                let id = generate_id();
                fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        Ok(Self { id, fields })
    }

    /// Rebuild a document from a persisted record
    ///
    /// The record key is authoritative; it is written back into `_id`.
    pub fn from_record(key: &str, record: Value) -> Result<Self> {
        if key.is_empty() {
            return Err(NestError::Storage("record with an empty id".to_string()));
        }
        let mut fields = match record {
            Value::Object(fields) => fields,
            _ => {
                return Err(NestError::Storage(format!(
                    "record '{key}' is not a JSON object"
                )))
            }
        };
        fields.insert(ID_FIELD.to_string(), Value::String(key.to_string()));

        Ok(Self {
            id: key.to_string(),
            fields,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Does this document satisfy `filter`?
    pub fn matches(&self, filter: &Value) -> bool {
        query::evaluate_fields(&self.fields, filter)
    }

    /// The document as a JSON object (including `_id`)
    pub fn as_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Produce a new opaque document id
///
/// `doc_<unix seconds>_<uuid v4>`: the timestamp keeps ids roughly
/// sortable by creation, the random part keeps ids minted in the same
/// second apart.
pub fn generate_id() -> String {
    format!(
        "doc_{}_{}",
        chrono::Utc::now().timestamp(),
        uuid::Uuid::new_v4().simple()
    )
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
