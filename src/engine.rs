use crate::collection::{Collection, SharedStorage};
use crate::document::Document;
use crate::errors::{DbError, Result};
use crate::schema::EntityType;
use crate::settings::Settings;
use crate::storage::{MemoryStorage, StorageEngine};
use crate::types::{CollectionName, DocumentId, Operation};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of collections sharing one storage sink.
pub struct Engine {
    storage: SharedStorage,
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("collections", &self.list_collection_names()).finish()
    }
}

impl Engine {
    pub fn new(storage: Box<dyn StorageEngine>) -> Self {
        Self { storage: Arc::new(RwLock::new(storage)), collections: RwLock::new(HashMap::new()) }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Builds an in-memory engine with one collection per configured entity.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let engine = Self::in_memory();
        for entity in settings.entity_types()? {
            engine.create_collection(entity)?;
        }
        Ok(engine)
    }

    pub fn create_collection(&self, entity: EntityType) -> Result<Arc<Collection>> {
        let name = entity.name().to_string();
        let mut cols = self.collections.write();
        if cols.contains_key(&name) {
            return Err(DbError::CollectionAlreadyExists(name));
        }
        let col = Arc::new(Collection::new(entity, Arc::clone(&self.storage)));
        cols.insert(name.clone(), Arc::clone(&col));
        log::info!("collection '{name}' registered");
        Ok(col)
    }

    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.get_collection(name).ok_or_else(|| DbError::NoSuchCollection(name.to_string()))
    }

    pub fn insert_document(&self, collection_name: &str, document: Document) -> Result<DocumentId> {
        self.collection(collection_name)?.insert_document(document)
    }

    pub fn update_document(
        &self,
        collection_name: &str,
        document_id: &DocumentId,
        new_document: Document,
    ) -> Result<bool> {
        self.collection(collection_name)?.update_document(document_id, new_document)
    }

    pub fn delete_document(&self, collection_name: &str, document_id: &DocumentId) -> Result<bool> {
        self.collection(collection_name)?.delete_document(document_id)
    }

    /// Everything the storage sink has received so far.
    pub fn operations(&self) -> Result<Vec<Operation>> {
        self.storage.read().read_all().map_err(|e| DbError::Storage(e.to_string()))
    }
}
