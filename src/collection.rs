use crate::digest::DigestOptions;
use crate::document::Document;
use crate::errors::{DbError, Result};
use crate::schema::EntityType;
use crate::storage::StorageEngine;
use crate::telemetry;
use crate::types::{DocumentId, Operation};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub type SharedStorage = Arc<RwLock<Box<dyn StorageEngine>>>;

#[derive(Clone, Copy)]
enum WriteMode {
    Insert,
    Update,
    Upsert,
}

pub struct Collection {
    entity: RwLock<EntityType>,
    docs: RwLock<HashMap<DocumentId, Document>>,
    storage: SharedStorage,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("entity", &*self.entity.read()).finish_non_exhaustive()
    }
}

impl Collection {
    pub fn new(entity: EntityType, storage: SharedStorage) -> Self {
        Self { entity: RwLock::new(entity), docs: RwLock::new(HashMap::new()), storage }
    }

    pub fn name_str(&self) -> String {
        self.entity.read().name().to_string()
    }

    /// Snapshot of the entity type, digest configuration included.
    pub fn entity_type(&self) -> EntityType {
        self.entity.read().clone()
    }

    /// Reconfigures digesting for every later save.
    pub fn configure(&self, opts: DigestOptions) -> Result<()> {
        self.entity.write().configure(opts)
    }

    pub fn set_auto(&self, enabled: bool) {
        self.entity.write().set_auto(enabled);
    }

    /// Fails with `DocumentAlreadyExists` when the id is already stored.
    pub fn insert_document(&self, mut document: Document) -> Result<DocumentId> {
        self.write(&mut document, WriteMode::Insert)?;
        Ok(document.id)
    }

    /// Replaces the document stored under `id`. Returns false when no such document exists.
    pub fn update_document(&self, id: &DocumentId, mut new_document: Document) -> Result<bool> {
        new_document.id = id.clone();
        self.write(&mut new_document, WriteMode::Update)
    }

    /// Inserts or updates `document` in place, so the caller sees the digested fields.
    pub fn save(&self, document: &mut Document) -> Result<DocumentId> {
        self.write(document, WriteMode::Upsert)?;
        Ok(document.id.clone())
    }

    // Lock order is entity, then docs. The docs guard is held across the
    // storage append so a concurrent delete cannot interleave.
    fn write(&self, document: &mut Document, mode: WriteMode) -> Result<bool> {
        let entity = self.entity.read();
        let mut docs = self.docs.write();
        let exists = docs.contains_key(&document.id);
        let op = match (mode, exists) {
            (WriteMode::Insert, true) => {
                return Err(DbError::DocumentAlreadyExists(document.id.to_string()));
            }
            (WriteMode::Update, false) => return Ok(false),
            (_, true) => "update",
            (_, false) => "insert",
        };
        let digested = entity.before_save(document)?;
        let operation = if exists {
            document.touch();
            Operation::Update { document_id: document.id.clone(), new_document: document.clone() }
        } else {
            Operation::Insert { document: document.clone() }
        };
        self.persist(&operation, op)?;
        docs.insert(document.id.clone(), document.clone());
        telemetry::log_audit(op, entity.name(), &document.id.to_string(), digested);
        Ok(true)
    }

    fn persist(&self, operation: &Operation, what: &str) -> Result<()> {
        let res = self.storage.write().append(operation);
        res.map_err(|e| {
            log::error!("storage append({what}) failed: {e}");
            DbError::Storage(e.to_string())
        })
    }

    pub fn find_document(&self, id: &DocumentId) -> Option<Document> {
        self.docs.read().get(id).cloned()
    }

    pub fn delete_document(&self, id: &DocumentId) -> Result<bool> {
        let entity = self.entity.read();
        let mut docs = self.docs.write();
        if !docs.contains_key(id) {
            return Ok(false);
        }
        self.persist(&Operation::Delete { document_id: id.clone() }, "delete")?;
        docs.remove(id);
        telemetry::log_audit("delete", entity.name(), &id.to_string(), 0);
        Ok(true)
    }

    pub fn get_all_documents(&self) -> Vec<Document> {
        self.docs.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Digests `candidate` with the current configuration and compares it to the stored field.
    pub fn verify_field(&self, id: &DocumentId, field: &str, candidate: &str) -> Result<bool> {
        let entity = self.entity.read();
        if !entity.digest_config().is_column(field) {
            return Err(DbError::UnknownField {
                entity: entity.name().to_string(),
                field: field.to_string(),
            });
        }
        let docs = self.docs.read();
        let doc = docs.get(id).ok_or_else(|| DbError::NoSuchDocument(id.to_string()))?;
        let Some(stored) = doc.get(field) else { return Ok(false) };
        let expected = entity.digest_value(candidate)?;
        Ok(expected.matches_bson(stored))
    }
}
