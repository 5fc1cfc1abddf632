use tracing::trace;

use crate::{
    executor::scan::Scanner,
    storage::bplus_tree::BPlusTree,
    types::{
        PageNum,
        error::DatabaseError,
        page::{LEAF_NODE_MAX_CELLS, PageType},
        row::Row,
    },
};

/// Walks the leaf level from left to right, following `next_leaf` links.
///
/// Nothing is read until the first call to [`Scanner::scan`]; after
/// [`Scanner::reset`] the walk starts again from the leftmost leaf.
pub struct SequentialScanner<'a> {
    tree: &'a mut BPlusTree,
    current_page_num: Option<PageNum>,
    current_cell: usize,
    leaves_visited: u32,
    is_exhausted: bool,
}

impl<'a> SequentialScanner<'a> {
    pub fn new(tree: &'a mut BPlusTree) -> Self {
        Self {
            tree,
            current_page_num: None,
            current_cell: 0,
            leaves_visited: 0,
            is_exhausted: false,
        }
    }

    fn start(&mut self) -> Result<PageNum, DatabaseError> {
        let page_num = self.tree.leftmost_leaf()?;
        self.current_page_num = Some(page_num);
        self.current_cell = 0;
        self.leaves_visited = 1;
        Ok(page_num)
    }

    fn advance_to(&mut self, next_page_num: PageNum) -> Result<(), DatabaseError> {
        // A sibling chain longer than the file means a cycle.
        if self.leaves_visited >= self.tree.page_count() {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("Leaf chain loops back at page {}", next_page_num),
            });
        }
        trace!(page_num = next_page_num, "scanning next leaf");
        self.current_page_num = Some(next_page_num);
        self.current_cell = 0;
        self.leaves_visited += 1;
        Ok(())
    }
}

impl Scanner for SequentialScanner<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        if self.is_exhausted {
            return Ok(None);
        }

        let mut page_num = match self.current_page_num {
            Some(page_num) => page_num,
            None => self.start()?,
        };

        loop {
            let page = self.tree.page(page_num)?;
            if page.page_type()? != PageType::LeafTable {
                return Err(DatabaseError::CorruptedPage {
                    page_num,
                    reason: "Sibling link points at a non-leaf page".to_string(),
                });
            }

            if self.current_cell < page.leaf_num_cells() {
                let row = page.leaf_row(self.current_cell)?;
                self.current_cell += 1;
                return Ok(Some(row));
            }

            match page.leaf_next() {
                0 => {
                    self.is_exhausted = true;
                    return Ok(None);
                }
                next_page_num => {
                    self.advance_to(next_page_num)?;
                    page_num = next_page_num;
                }
            }
        }
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::with_capacity(batch_size.min(LEAF_NODE_MAX_CELLS));
        while rows.len() < batch_size {
            match self.scan()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.current_page_num = None;
        self.current_cell = 0;
        self.leaves_visited = 0;
        self.is_exhausted = false;
        Ok(())
    }
}
