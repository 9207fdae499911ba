//! Database Registry
//!
//! Process-wide table of open databases, constructed once and shared by
//! every session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;

use super::Database;

/// Maps database name → shared `Database`
///
/// ## Concurrency:
/// - `databases`: one Mutex around lookup *and* creation, so two sessions
///   naming a new database at the same moment get the same handle
/// - Handles are never evicted; they live as long as the registry
pub struct DatabaseRegistry {
    /// Directory under which each database gets a sub-directory
    root: PathBuf,

    /// Open databases
    databases: Mutex<HashMap<String, Arc<Database>>>,
}

impl DatabaseRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            databases: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// Get the database called `name`, creating it on first use
    pub fn resolve(&self, name: &str) -> Result<Arc<Database>> {
        let mut databases = self.databases.lock();

        if let Some(db) = databases.get(name) {
            return Ok(Arc::clone(db));
        }

        let db = Arc::new(Database::open(&self.root, name)?);
        databases.insert(name.to_string(), Arc::clone(&db));
        tracing::debug!("Opened database {} at {}", name, db.dir().display());

        Ok(db)
    }

    /// Number of databases opened so far
    pub fn len(&self) -> usize {
        self.databases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the open databases, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
