use crate::types::DocumentId;
use bson::Document as BsonDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    pub fn new() -> Self {
        let now = Utc::now();
        Self { created_at: now, updated_at: now }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A stored entity: id, field map and timestamps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(data: BsonDocument) -> Self {
        Self { id: DocumentId::new(), data, metadata: Metadata::new() }
    }

    pub fn get(&self, field: &str) -> Option<&bson::Bson> {
        self.data.get(field)
    }

    /// Sets a single field, as a caller would before saving again.
    pub fn set(&mut self, field: &str, value: impl Into<bson::Bson>) {
        self.data.insert(field, value.into());
    }

    pub fn update(&mut self, new_data: BsonDocument) {
        self.data = new_data;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}
