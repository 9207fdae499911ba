//! Collection store
//!
//! Load-mutate-save over a single collection file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{generate_id, Document, ID_FIELD};
use crate::error::{NestError, Result};
use crate::query;

use super::snapshot::{read_snapshot, write_snapshot};

/// In-memory state of one collection, in file order
#[derive(Debug, Clone, Default)]
pub struct Collection {
    documents: IndexMap<String, Document>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot (`{ id: fields, ... }`)
    pub fn from_snapshot(snapshot: Value) -> Result<Self> {
        let records = match snapshot {
            Value::Object(records) => records,
            _ => {
                return Err(NestError::Storage(
                    "collection snapshot is not a JSON object".to_string(),
                ))
            }
        };

        let mut documents = IndexMap::with_capacity(records.len());
        for (key, record) in records {
            let document = Document::from_record(&key, record)?;
            documents.insert(key, document);
        }

        Ok(Self { documents })
    }

    /// Snapshot form: id → full field set
    pub fn to_snapshot(&self) -> Value {
        let records: Map<String, Value> = self
            .documents
            .iter()
            .map(|(id, doc)| (id.clone(), doc.as_value()))
            .collect();
        Value::Object(records)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Insert or replace by id. Returns the replaced document, if any.
    ///
    /// A replaced document keeps its position in file order.
    pub fn upsert(&mut self, document: Document) -> Option<Document> {
        self.documents.insert(document.id().to_string(), document)
    }

    /// Documents matching `filter`, in file order
    pub fn matching(&self, filter: &Value) -> Vec<Document> {
        self.documents
            .values()
            .filter(|doc| doc.matches(filter))
            .cloned()
            .collect()
    }

    /// Remove every document matching `filter`; returns how many went
    pub fn remove_matching(&mut self, filter: &Value) -> usize {
        let before = self.documents.len();
        self.documents.retain(|_, doc| !doc.matches(filter));
        before - self.documents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }
}

/// Handle on one collection file
///
/// Every operation loads the whole file and, for mutations, writes the
/// whole file back. Callers serialize mutations (see `Database`).
#[derive(Debug, Clone)]
pub struct CollectionStore {
    name: String,
    path: PathBuf,
}

impl CollectionStore {
    const EXTENSION: &'static str = "json";

    /// Handle for collection `name` stored under `dir`
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: dir.join(format!("{}.{}", name, Self::EXTENSION)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current state; a collection never written is empty
    pub fn load(&self) -> Result<Collection> {
        match read_snapshot(&self.path)? {
            Some(snapshot) => Collection::from_snapshot(snapshot).map_err(|e| match e {
                NestError::Storage(msg) => NestError::Storage(format!(
                    "collection '{}' ({}): {}",
                    self.name,
                    self.path.display(),
                    msg
                )),
                other => other,
            }),
            None => Ok(Collection::new()),
        }
    }

    /// Persist a complete snapshot
    pub fn save(&self, collection: &Collection) -> Result<()> {
        write_snapshot(&self.path, &collection.to_snapshot())
    }

    /// Insert (or replace, by `_id`) a document
    ///
    /// Steps:
    /// 1. Load the full collection
    /// 2. Assign an `_id` if the payload has none (re-rolled until unused)
    /// 3. Upsert by id
    /// 4. Persist the full new state
    pub fn insert(&self, payload: Value) -> Result<Document> {
        let mut collection = self.load()?;

        let payload = match payload {
            Value::Object(mut fields) if !fields.contains_key(ID_FIELD) => {
                let mut id = generate_id();
                while collection.contains(&id) {
                    id = generate_id();
                }
                fields.insert(ID_FIELD.to_string(), Value::String(id));
                Value::Object(fields)
            }
            other => other,
        };
        let document = Document::new(payload)?;

        if collection.upsert(document.clone()).is_some() {
            tracing::debug!(
                "Replaced document {} in collection {}",
                document.id(),
                self.name
            );
        }
        self.save(&collection)?;

        Ok(document)
    }

    /// Every document matching `filter`, in file order
    pub fn find(&self, filter: &Value) -> Result<Vec<Document>> {
        query::validate(filter)?;
        let collection = self.load()?;
        Ok(collection.matching(filter))
    }

    /// Remove every document matching `filter`
    ///
    /// Returns the number removed. With no matches the stored state is left
    /// exactly as it was.
    pub fn remove(&self, filter: &Value) -> Result<usize> {
        query::validate(filter)?;
        let mut collection = self.load()?;

        let removed = collection.remove_matching(filter);
        if removed > 0 {
            self.save(&collection)?;
        }

        Ok(removed)
    }

    /// Number of stored documents
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}
