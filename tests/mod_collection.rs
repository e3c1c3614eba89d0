use bson::{Bson, doc};
use docdigest::collection::{Collection, SharedStorage};
use docdigest::digest::DigestOptions;
use docdigest::document::Document;
use docdigest::errors::DbError;
use docdigest::schema::EntityType;
use docdigest::storage::{MemoryStorage, StorageEngine};
use docdigest::telemetry;
use docdigest::types::Operation;
use parking_lot::RwLock;
use std::io;
use std::sync::Arc;

fn storage() -> SharedStorage {
    Arc::new(RwLock::new(Box::new(MemoryStorage::new())))
}

fn users(opts: DigestOptions) -> Collection {
    let entity = EntityType::new("users", ["name", "password"])
        .with_digest(DigestOptions::new().columns(["password"]).auto(true))
        .unwrap()
        .with_digest(opts)
        .unwrap();
    Collection::new(entity, storage())
}

#[test]
fn insert_digests_configured_column() {
    let col = users(DigestOptions::new());
    let id = col.insert_document(Document::new(doc! { "name": "ann", "password": "testvalue" })).unwrap();
    let stored = col.find_document(&id).unwrap();
    assert_eq!(stored.data.get_str("password").unwrap(), "e9de89b0a5e9ad6efd5e5ab543ec617c");
    assert_eq!(stored.data.get_str("name").unwrap(), "ann");
}

#[test]
fn update_digests_new_value() {
    let col = users(DigestOptions::new());
    let id = col.insert_document(Document::new(doc! { "name": "ann", "password": "testvalue" })).unwrap();
    let updated = col
        .update_document(&id, Document::new(doc! { "name": "ann", "password": "testvalue2" }))
        .unwrap();
    assert!(updated);
    let stored = col.find_document(&id).unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.data.get_str("password").unwrap(), "91c04cd25d9cc5fc44b7e4086e022d4d");
}

#[test]
fn update_of_missing_document_returns_false() {
    let col = users(DigestOptions::new());
    let doc = Document::new(doc! { "password": "x" });
    let id = doc.id.clone();
    assert!(!col.update_document(&id, doc).unwrap());
    assert!(col.is_empty());
}

#[test]
fn auto_off_leaves_value_unchanged() {
    let col = users(DigestOptions::new().auto(false));
    let mut doc = Document::new(doc! { "name": "ann", "password": "testvalue2" });
    col.save(&mut doc).unwrap();
    assert_eq!(doc.data.get_str("password").unwrap(), "testvalue2");
    let stored = col.find_document(&doc.id).unwrap();
    assert_eq!(stored.data.get_str("password").unwrap(), "testvalue2");
}

#[test]
fn toggling_auto_takes_effect_on_next_save() {
    let col = users(DigestOptions::new().auto(false));
    let mut doc = Document::new(doc! { "password": "testvalue" });
    col.save(&mut doc).unwrap();
    assert_eq!(doc.data.get_str("password").unwrap(), "testvalue");
    col.set_auto(true);
    col.save(&mut doc).unwrap();
    assert_eq!(doc.data.get_str("password").unwrap(), "e9de89b0a5e9ad6efd5e5ab543ec617c");
}

#[test]
fn null_and_missing_columns_are_skipped() {
    let col = users(DigestOptions::new());
    let id = col.insert_document(Document::new(doc! { "name": "ann", "password": Bson::Null })).unwrap();
    assert_eq!(col.find_document(&id).unwrap().get("password"), Some(&Bson::Null));

    let id = col.insert_document(Document::new(doc! { "name": "bob" })).unwrap();
    assert!(col.find_document(&id).unwrap().get("password").is_none());
}

#[test]
fn double_save_digests_again() {
    let col = users(DigestOptions::new());
    let mut doc = Document::new(doc! { "password": "testvalue" });
    col.save(&mut doc).unwrap();
    let first = doc.data.get_str("password").unwrap().to_string();
    assert_eq!(first, "e9de89b0a5e9ad6efd5e5ab543ec617c");
    col.save(&mut doc).unwrap();
    let second = doc.data.get_str("password").unwrap().to_string();
    assert_ne!(first, second);
    assert_eq!(second, "a2233af11673ac0693db68729aa6b90e");
    assert_eq!(col.len(), 1);
}

#[test]
fn binary_encoding_stores_generic_binary() {
    let col = users(DigestOptions::new().encoding("binary"));
    let id = col.insert_document(Document::new(doc! { "password": "testvalue" })).unwrap();
    match col.find_document(&id).unwrap().get("password") {
        Some(Bson::Binary(b)) => {
            assert_eq!(hex::encode(&b.bytes), "e9de89b0a5e9ad6efd5e5ab543ec617c");
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn storage_receives_digested_value() {
    let store = storage();
    let entity = EntityType::new("users", ["password"])
        .with_digest(DigestOptions::new().columns(["password"]))
        .unwrap();
    let col = Collection::new(entity, Arc::clone(&store));
    let id = col.insert_document(Document::new(doc! { "password": "testvalue" })).unwrap();
    assert!(col.delete_document(&id).unwrap());
    let ops = store.read().read_all().unwrap();
    assert_eq!(ops.len(), 2);
    match &ops[0] {
        Operation::Insert { document } => {
            assert_eq!(document.data.get_str("password").unwrap(), "e9de89b0a5e9ad6efd5e5ab543ec617c");
        }
        other => panic!("unexpected op {other:?}"),
    }
    assert!(matches!(&ops[1], Operation::Delete { document_id } if *document_id == id));
}

#[test]
fn digest_error_aborts_save_before_storage() {
    let store = storage();
    let entity = EntityType::new("users", ["password"])
        .with_digest(DigestOptions::new().columns(["password"]))
        .unwrap();
    let col = Collection::new(entity, Arc::clone(&store));
    let err = col.insert_document(Document::new(doc! { "password": ["a", "b"] })).unwrap_err();
    assert!(matches!(err, DbError::UnsupportedValue { ref field, .. } if field == "password"));
    assert!(store.read().read_all().unwrap().is_empty());
    assert!(col.is_empty());
}

struct FailingStorage;

impl StorageEngine for FailingStorage {
    fn append(&mut self, _operation: &Operation) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }

    fn read_all(&self) -> io::Result<Vec<Operation>> {
        Ok(vec![])
    }
}

#[test]
fn storage_failure_surfaces_and_skips_cache() {
    let store: SharedStorage = Arc::new(RwLock::new(Box::new(FailingStorage)));
    let entity = EntityType::new("users", ["password"]);
    let col = Collection::new(entity, store);
    let err = col.insert_document(Document::new(doc! { "password": "x" })).unwrap_err();
    assert!(matches!(err, DbError::Storage(ref m) if m.contains("disk full")));
    assert!(col.is_empty());
}

#[test]
fn manual_digest_ignores_auto_flag() {
    let col = users(DigestOptions::new().auto(false));
    let entity = col.entity_type();
    let mut doc = Document::new(doc! { "password": "testvalue" });
    assert_eq!(entity.digest_document(&mut doc).unwrap(), 1);
    assert_eq!(doc.data.get_str("password").unwrap(), "e9de89b0a5e9ad6efd5e5ab543ec617c");
}

#[test]
fn verify_field_checks_candidate() {
    let col = users(DigestOptions::new().algorithm("SHA-256").encoding("base64"));
    let id = col.insert_document(Document::new(doc! { "name": "ann", "password": "hunter2" })).unwrap();
    assert!(col.verify_field(&id, "password", "hunter2").unwrap());
    assert!(!col.verify_field(&id, "password", "hunter3").unwrap());
    assert!(matches!(col.verify_field(&id, "name", "ann"), Err(DbError::UnknownField { .. })));
    let missing = docdigest::types::DocumentId::new();
    assert!(matches!(col.verify_field(&missing, "password", "x"), Err(DbError::NoSuchDocument(_))));
}

#[test]
fn reconfigure_rejects_unknown_column() {
    let col = users(DigestOptions::new());
    let err = col.configure(DigestOptions::new().columns(["email"])).unwrap_err();
    assert!(matches!(err, DbError::UnknownColumn { .. }));
    assert_eq!(col.entity_type().digest_config().columns(), ["password".to_string()]);
}

#[test]
fn saves_emit_audit_lines() {
    let _guard = telemetry::enable_thread_sink();
    let entity = EntityType::new("audited_users", ["password"])
        .with_digest(DigestOptions::new().columns(["password"]))
        .unwrap();
    let col = Collection::new(entity, storage());
    let mut doc = Document::new(doc! { "password": "testvalue" });
    col.save(&mut doc).unwrap();
    col.save(&mut doc).unwrap();
    let lines = telemetry::take_lines();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["op"], "insert");
    assert_eq!(first["collection"], "audited_users");
    assert_eq!(first["digested"], 1);
    let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(second["op"], "update");
    assert_eq!(second["doc_id"], doc.id.to_string());
}

#[test]
fn insert_with_existing_id_is_rejected() {
    let store = storage();
    let entity = EntityType::new("users", ["password"])
        .with_digest(DigestOptions::new().columns(["password"]))
        .unwrap();
    let col = Collection::new(entity, Arc::clone(&store));
    let doc = Document::new(doc! { "password": "testvalue" });
    let id = col.insert_document(doc.clone()).unwrap();
    let err = col.insert_document(doc).unwrap_err();
    assert!(matches!(err, DbError::DocumentAlreadyExists(ref s) if *s == id.to_string()));
    assert_eq!(col.len(), 1);
    assert_eq!(store.read().read_all().unwrap().len(), 1);
    assert_eq!(
        col.find_document(&id).unwrap().data.get_str("password").unwrap(),
        "e9de89b0a5e9ad6efd5e5ab543ec617c"
    );
}

#[test]
fn update_after_delete_does_not_restore() {
    let col = users(DigestOptions::new());
    let id = col.insert_document(Document::new(doc! { "password": "a" })).unwrap();
    assert!(col.delete_document(&id).unwrap());
    assert!(!col.update_document(&id, Document::new(doc! { "password": "b" })).unwrap());
    assert!(col.find_document(&id).is_none());
}

#[test]
fn concurrent_update_and_delete_agree() {
    let col = Arc::new(users(DigestOptions::new()));
    for _ in 0..200 {
        let id = col.insert_document(Document::new(doc! { "password": "a" })).unwrap();
        let updater = {
            let col = Arc::clone(&col);
            let id = id.clone();
            std::thread::spawn(move || {
                col.update_document(&id, Document::new(doc! { "password": "b" })).unwrap()
            })
        };
        let deleted = col.delete_document(&id).unwrap();
        updater.join().unwrap();
        assert!(deleted);
        assert!(col.find_document(&id).is_none());
    }
}
