use crate::infrastructure::db::Document;
use crate::infrastructure::StorageResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// A schema-less movie: a server-assigned `id` plus whatever fields the
/// client sent, flattened on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieRecord {
    pub id: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

impl MovieRecord {
    /// Builds a record with a fresh 128-bit random id (32 hex chars).
    pub fn new(fields: Map<String, Value>) -> Self {
        Self::with_id(Uuid::new_v4().simple().to_string(), fields)
    }

    /// Any `id` among `fields` is dropped; the given one wins.
    pub fn with_id(id: String, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    pub fn to_document(&self) -> Document {
        let mut document = self.fields.clone();
        document.insert("id".to_string(), Value::String(self.id.clone()));
        document
    }

    pub fn from_document(document: Document) -> StorageResult<Self> {
        Ok(serde_json::from_value(Value::Object(document))?)
    }
}
