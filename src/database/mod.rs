//! Database Module
//!
//! A database is a directory of collection files plus the lock that
//! serializes mutations against them.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader per database
//!
//! - **Mutations** (insert/remove): exclusive `write()` on the database lock,
//!   so no two sessions ever rewrite a collection file concurrently
//! - **Finds**: shared `read()` on the same lock; they never observe a file
//!   mid-rewrite (and snapshots are replaced by atomic rename anyway)
//!
//! Databases are handed out by the [`DatabaseRegistry`], which guarantees a
//! single shared `Database` per name.

mod registry;

pub use registry::DatabaseRegistry;

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::Value;

use crate::document::Document;
use crate::error::{NestError, Result};
use crate::protocol::Command;
use crate::storage::CollectionStore;

/// Result of executing one command against a database
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The stored document (with its `_id`)
    Inserted(Document),

    /// Matching documents in file order
    Found(Vec<Document>),

    /// Number of documents removed
    Deleted(usize),
}

/// A named set of collections
pub struct Database {
    /// Database name as given by the client
    name: String,

    /// Directory holding one file per collection
    dir: PathBuf,

    /// Serializes mutations, shared by finds
    lock: RwLock<()>,
}

impl Database {
    /// Open (creating if needed) database `name` under `root`
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        validate_name("Database", name)?;

        let dir = root.join(name);
        fs::create_dir_all(&dir)?;

        Ok(Self {
            name: name.to_string(),
            dir,
            lock: RwLock::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store handle for a collection of this database
    pub fn collection(&self, name: &str) -> Result<CollectionStore> {
        validate_name("Collection", name)?;
        if name.starts_with('.') {
            return Err(NestError::InvalidIdentifier(format!(
                "collection names cannot start with '.': {name}"
            )));
        }
        Ok(CollectionStore::new(&self.dir, name))
    }

    /// Execute a parsed command
    pub fn execute(&self, command: &Command) -> Result<Outcome> {
        match command {
            Command::Insert {
                collection,
                document,
            } => self
                .insert(collection, document.clone())
                .map(Outcome::Inserted),
            Command::Find { collection, filter } => {
                self.find(collection, filter).map(Outcome::Found)
            }
            Command::Delete { collection, filter } => {
                self.remove(collection, filter).map(Outcome::Deleted)
            }
        }
    }

    /// Insert or replace a document
    pub fn insert(&self, collection: &str, document: Value) -> Result<Document> {
        let store = self.collection(collection)?;
        let _write_guard = self.lock.write();
        store.insert(document)
    }

    /// Find documents matching `filter`
    pub fn find(&self, collection: &str, filter: &Value) -> Result<Vec<Document>> {
        let store = self.collection(collection)?;
        let _read_guard = self.lock.read();
        store.find(filter)
    }

    /// Remove documents matching `filter`
    pub fn remove(&self, collection: &str, filter: &Value) -> Result<usize> {
        let store = self.collection(collection)?;
        let _write_guard = self.lock.write();
        store.remove(filter)
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        let store = self.collection(collection)?;
        let _read_guard = self.lock.read();
        store.count()
    }
}

/// Check a database or collection name
///
/// Names become path components, so separators and dot-only names are
/// refused along with blank ones.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(NestError::EmptyIdentifier(kind));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(NestError::InvalidIdentifier(format!(
            "{} name '{}' is not allowed",
            kind.to_lowercase(),
            name
        )));
    }
    Ok(())
}
