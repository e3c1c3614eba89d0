use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type CollectionName = String;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a collection hands to its storage sink on each write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Operation {
    Insert { document: Document },
    Update { document_id: DocumentId, new_document: Document },
    Delete { document_id: DocumentId },
}
