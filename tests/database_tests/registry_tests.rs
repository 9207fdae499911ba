//! Tests for databases and the registry
//!
//! These tests verify:
//! - Name validation for databases and collections
//! - One shared handle per database name
//! - Command execution through `Database::execute`
//! - Concurrent access patterns (no lost updates)

use std::sync::Arc;
use std::thread;

use nestdb::error::NestError;
use nestdb::protocol::Command;
use nestdb::{Config, Database, DatabaseRegistry, Outcome};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> (TempDir, Arc<DatabaseRegistry>) {
    let temp_dir = TempDir::new().unwrap();
    let registry = Arc::new(DatabaseRegistry::new(temp_dir.path()));
    (temp_dir, registry)
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_resolve_creates_directory() {
    let (temp, registry) = setup_registry();
    let db = registry.resolve("shop").unwrap();

    assert_eq!(db.name(), "shop");
    assert!(temp.path().join("shop").is_dir());
    assert_eq!(registry.names(), vec!["shop".to_string()]);
}

#[test]
fn test_resolve_returns_same_handle() {
    let (_temp, registry) = setup_registry();
    let first = registry.resolve("shop").unwrap();
    let second = registry.resolve("shop").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_resolve_rejects_bad_names() {
    let (_temp, registry) = setup_registry();

    assert!(matches!(registry.resolve(""), Err(NestError::EmptyIdentifier(_))));
    assert!(matches!(registry.resolve("   "), Err(NestError::EmptyIdentifier(_))));
    assert!(matches!(registry.resolve(".."), Err(NestError::InvalidIdentifier(_))));
    assert!(matches!(registry.resolve("a/b"), Err(NestError::InvalidIdentifier(_))));
    assert!(registry.is_empty());
}

#[test]
fn test_registry_from_config() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp.path()).build();
    let registry = DatabaseRegistry::from_config(&config);
    assert_eq!(registry.root(), temp.path());
}

#[test]
fn test_concurrent_resolve_shares_one_database() {
    let (_temp, registry) = setup_registry();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.resolve("shared").unwrap())
        })
        .collect();
    let dbs: Vec<Arc<Database>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for db in &dbs[1..] {
        assert!(Arc::ptr_eq(&dbs[0], db));
    }
    assert_eq!(registry.len(), 1);
}

// =============================================================================
// Database Tests
// =============================================================================

#[test]
fn test_collection_name_validation() {
    let (_temp, registry) = setup_registry();
    let db = registry.resolve("shop").unwrap();

    assert!(matches!(db.collection(""), Err(NestError::EmptyIdentifier(_))));
    assert!(matches!(db.collection("../x"), Err(NestError::InvalidIdentifier(_))));
    assert!(matches!(db.collection(".hidden"), Err(NestError::InvalidIdentifier(_))));
    db.collection("items").unwrap();
}

#[test]
fn test_execute_commands() {
    let (_temp, registry) = setup_registry();
    let db = registry.resolve("shop").unwrap();

    let inserted = db
        .execute(&Command::Insert {
            collection: "items".to_string(),
            document: json!({"_id": "i1", "price": 5}),
        })
        .unwrap();
    assert!(matches!(inserted, Outcome::Inserted(ref d) if d.id() == "i1"));

    let found = db
        .execute(&Command::Find {
            collection: "items".to_string(),
            filter: json!({}),
        })
        .unwrap();
    match found {
        Outcome::Found(docs) => assert_eq!(docs.len(), 1),
        other => panic!("expected Found, got {:?}", other),
    }

    let deleted = db
        .execute(&Command::Delete {
            collection: "items".to_string(),
            filter: json!({"price": 5}),
        })
        .unwrap();
    assert_eq!(deleted, Outcome::Deleted(1));
}

#[test]
fn test_collections_are_separate_files() {
    let (temp, registry) = setup_registry();
    let db = registry.resolve("shop").unwrap();

    db.insert("items", json!({"a": 1})).unwrap();
    db.insert("orders", json!({"b": 2})).unwrap();

    assert!(temp.path().join("shop").join("items.json").is_file());
    assert!(temp.path().join("shop").join("orders.json").is_file());
    assert_eq!(db.count("items").unwrap(), 1);
    assert_eq!(db.count("orders").unwrap(), 1);
}

#[test]
fn test_databases_are_isolated() {
    let (_temp, registry) = setup_registry();
    registry.resolve("a").unwrap().insert("c", json!({"x": 1})).unwrap();

    let b = registry.resolve("b").unwrap();
    assert!(b.find("c", &json!({})).unwrap().is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_inserts_are_not_lost() {
    let (_temp, registry) = setup_registry();
    let threads = 8;
    let per_thread = 10;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let db = registry.resolve("busy").unwrap();
                for i in 0..per_thread {
                    db.insert("events", json!({"_id": format!("t{t}-{i}"), "thread": t}))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let db = registry.resolve("busy").unwrap();
    let all = db.find("events", &json!({})).unwrap();
    assert_eq!(all.len(), threads * per_thread);
}

#[test]
fn test_concurrent_reads_during_writes() {
    let (_temp, registry) = setup_registry();
    let db = registry.resolve("mixed").unwrap();
    db.insert("c", json!({"_id": "seed"})).unwrap();

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for i in 0..20 {
                db.insert("c", json!({"_id": format!("w{i}")})).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for _ in 0..20 {
                    // Never a half-written file
                    let n = db.find("c", &json!({})).unwrap().len();
                    assert!((1..=21).contains(&n));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(db.count("c").unwrap(), 21);
}
