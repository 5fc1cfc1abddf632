use crate::{
    config::FlushPolicy,
    storage::bplus_tree::BPlusTree,
    types::{error::DatabaseError, row::Row},
};

/// Trait for inserting rows into the table
pub trait Inserter {
    /// Insert a single row
    fn insert(&mut self, row: &Row) -> Result<(), DatabaseError>;

    /// Insert rows in order, stopping at the first failure.
    ///
    /// Rows inserted before the failure stay in the table.
    fn insert_batch(&mut self, rows: &[Row]) -> Result<usize, DatabaseError>;
}

/// Inserts into a [`BPlusTree`] and applies the flush policy after each row.
pub struct TableInserter<'a> {
    tree: &'a mut BPlusTree,
    flush_policy: FlushPolicy,
}

impl<'a> TableInserter<'a> {
    pub fn new(tree: &'a mut BPlusTree, flush_policy: FlushPolicy) -> Self {
        Self { tree, flush_policy }
    }

    fn after_insert(&mut self) -> Result<(), DatabaseError> {
        match self.flush_policy {
            FlushPolicy::Eager => self.tree.flush(),
            FlushPolicy::OnExit => Ok(()),
        }
    }
}

impl Inserter for TableInserter<'_> {
    fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        self.tree.insert(row)?;
        self.after_insert()
    }

    fn insert_batch(&mut self, rows: &[Row]) -> Result<usize, DatabaseError> {
        for row in rows {
            self.tree.insert(row)?;
        }
        self.after_insert()?;
        Ok(rows.len())
    }
}
