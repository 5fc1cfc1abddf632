use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{config::DatabaseConfig, storage::bplus_tree::BPlusTree, types::error::DatabaseError};

/// A database file inside its own temporary directory, removed on drop.
pub struct TempDatabase {
    dir: TempDir,
    path: PathBuf,
}

impl TempDatabase {
    pub fn new() -> Result<Self, DatabaseError> {
        Self::with_prefix("cqlite_test")
    }

    pub fn with_prefix(prefix: &str) -> Result<Self, DatabaseError> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        let path = dir.path().join("test.db");
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn open(&self) -> Result<BPlusTree, DatabaseError> {
        self.open_with(&DatabaseConfig::default())
    }

    pub fn open_with(&self, config: &DatabaseConfig) -> Result<BPlusTree, DatabaseError> {
        BPlusTree::open(&self.path, config)
    }
}
