use std::path::Path;

use tracing::debug;

use crate::{
    config::DatabaseConfig,
    executor::{scan::ScanIterator, sequential_scan::SequentialScanner},
    storage::pager::Pager,
    types::{
        Key, PageNum,
        error::DatabaseError,
        page::{
            LEAF_NODE_CELL_SIZE, LEAF_NODE_KEY_SIZE, LEAF_NODE_LEFT_SPLIT_COUNT,
            LEAF_NODE_MAX_CELLS, Page, PageType,
        },
        row::Row,
    },
};

/// Position of a key inside a leaf: where it is stored, or where it would go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page_num: PageNum,
    pub cell_num: usize,
}

/// A split that still has to be registered in the parent of `left`.
#[derive(Debug, Clone, Copy)]
struct SplitResult {
    left: PageNum,
    separator_key: Key,
    right: PageNum,
}

/// The table: one B+ tree of rows keyed by `id`.
///
/// Every node is addressed by page number through the [`Pager`]; parent links
/// are page numbers too, so the split cascade walks upwards by lookup instead
/// of holding references to parent nodes.
pub struct BPlusTree {
    pager: Pager,
    root_page_num: PageNum,
    internal_max_keys: usize,
}

impl BPlusTree {
    pub fn open<P: AsRef<Path>>(path: P, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pager = Pager::open(path, config.max_pages, config.internal_max_keys)?;
        Self::new(pager)
    }

    /// Wraps an open pager, initializing an empty root leaf for a new file.
    pub fn new(mut pager: Pager) -> Result<Self, DatabaseError> {
        let root_page_num = pager.header().root_page_num;
        let internal_max_keys = pager.header().internal_max_keys as usize;

        if pager.page_count() <= root_page_num {
            let root = pager.page_mut(root_page_num)?;
            root.init_leaf();
            root.set_root(true);
        } else {
            let root = pager.page(root_page_num)?;
            root.page_type()?;
            if !root.is_root() {
                return Err(DatabaseError::CorruptedPage {
                    page_num: root_page_num,
                    reason: "Root page is not flagged as root".to_string(),
                });
            }
        }

        Ok(Self {
            pager,
            root_page_num,
            internal_max_keys,
        })
    }

    pub fn root_page_num(&self) -> PageNum {
        self.root_page_num
    }

    pub fn internal_max_keys(&self) -> usize {
        self.internal_max_keys
    }

    pub fn page_count(&self) -> u32 {
        self.pager.page_count()
    }

    pub fn max_pages(&self) -> u32 {
        self.pager.max_pages()
    }

    /// Read access to one node of the tree.
    pub fn page(&mut self, page_num: PageNum) -> Result<&Page, DatabaseError> {
        self.pager.page(page_num)
    }

    pub fn flush(&mut self) -> Result<(), DatabaseError> {
        self.pager.flush_all()
    }

    /// Flushes every page and releases the file.
    pub fn close(mut self) -> Result<(), DatabaseError> {
        self.flush()
    }

    /// Upper bound on tree height; anything deeper means a cycle in a damaged file.
    fn max_depth(&self) -> u32 {
        self.pager.max_pages()
    }

    /// Descends from the root to the leaf whose range contains `key`.
    pub fn find(&mut self, key: Key) -> Result<Cursor, DatabaseError> {
        let max_depth = self.max_depth();
        let mut page_num = self.root_page_num;
        for _ in 0..=max_depth {
            let page = self.pager.page(page_num)?;
            match page.page_type()? {
                PageType::LeafTable => {
                    return Ok(Cursor {
                        page_num,
                        cell_num: page.leaf_find(key),
                    });
                }
                PageType::InteriorTable => {
                    let child_num = page.internal_find_child(key);
                    page_num = page.internal_child(child_num);
                }
            }
        }
        Err(DatabaseError::CorruptedDatabase {
            reason: format!("Tree is deeper than {} levels", max_depth),
        })
    }

    pub fn get(&mut self, key: Key) -> Result<Option<Row>, DatabaseError> {
        let cursor = self.find(key)?;
        let leaf = self.pager.page(cursor.page_num)?;
        if cursor.cell_num < leaf.leaf_num_cells() && leaf.leaf_key(cursor.cell_num) == key {
            Ok(Some(leaf.leaf_row(cursor.cell_num)?))
        } else {
            Ok(None)
        }
    }

    /// Inserts `row` keyed by its id.
    ///
    /// Fails without touching any page when the id already exists, when the
    /// row does not encode, or when a split would need more pages than the
    /// pager has left.
    pub fn insert(&mut self, row: &Row) -> Result<(), DatabaseError> {
        let key = row.id;
        let mut cell = [0u8; LEAF_NODE_CELL_SIZE];
        cell[..LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        row.serialize_into(&mut cell[LEAF_NODE_KEY_SIZE..])?;

        let cursor = self.find(key)?;
        let leaf = self.pager.page(cursor.page_num)?;
        let num_cells = leaf.leaf_num_cells();
        if cursor.cell_num < num_cells && leaf.leaf_key(cursor.cell_num) == key {
            return Err(DatabaseError::DuplicateKey { key });
        }

        if num_cells < LEAF_NODE_MAX_CELLS {
            self.pager
                .page_mut(cursor.page_num)?
                .leaf_insert_cell(cursor.cell_num, &cell);
            return Ok(());
        }

        let needed = self.pages_needed_for_split(cursor.page_num)?;
        if needed > self.pager.free_page_slots() {
            return Err(DatabaseError::TableFull {
                max_pages: self.pager.max_pages(),
            });
        }
        let split = self.split_leaf_and_insert(cursor, &cell)?;
        self.insert_into_parent(split)
    }

    /// Counts the pages a split starting at `leaf_page_num` will allocate:
    /// the new leaf, one page per full ancestor, and a new left child if the
    /// cascade reaches the root.
    fn pages_needed_for_split(&mut self, leaf_page_num: PageNum) -> Result<u32, DatabaseError> {
        let max_depth = self.max_depth();
        let mut needed = 1;
        let mut page_num = leaf_page_num;
        for _ in 0..=max_depth {
            let page = self.pager.page(page_num)?;
            if page.is_root() {
                return Ok(needed + 1);
            }
            let parent_page_num = page.parent();
            if self.pager.page(parent_page_num)?.internal_num_keys() < self.internal_max_keys {
                return Ok(needed);
            }
            needed += 1;
            page_num = parent_page_num;
        }
        Err(DatabaseError::CorruptedDatabase {
            reason: format!("Parent chain longer than {} levels", max_depth),
        })
    }

    /// Splits a full leaf, placing `cell` in sorted position. The lower half
    /// stays in the old leaf, the upper half moves to a new right sibling.
    fn split_leaf_and_insert(
        &mut self,
        cursor: Cursor,
        cell: &[u8],
    ) -> Result<SplitResult, DatabaseError> {
        let old_page_num = cursor.page_num;
        let (mut cells, parent, next_leaf) = {
            let old = self.pager.page(old_page_num)?;
            let cells: Vec<Vec<u8>> = (0..old.leaf_num_cells())
                .map(|i| old.leaf_cell(i).to_vec())
                .collect();
            (cells, old.parent(), old.leaf_next())
        };
        cells.insert(cursor.cell_num, cell.to_vec());

        let new_page_num = self.pager.allocate_page()?;
        let new_leaf = self.pager.page_mut(new_page_num)?;
        new_leaf.init_leaf();
        new_leaf.set_parent(parent);
        new_leaf.set_leaf_next(next_leaf);
        for (i, cell) in cells[LEAF_NODE_LEFT_SPLIT_COUNT..].iter().enumerate() {
            new_leaf.write_leaf_cell(i, cell);
        }
        new_leaf.set_leaf_num_cells(cells.len() - LEAF_NODE_LEFT_SPLIT_COUNT);
        let separator_key = new_leaf.leaf_key(0);

        let old_leaf = self.pager.page_mut(old_page_num)?;
        for (i, cell) in cells[..LEAF_NODE_LEFT_SPLIT_COUNT].iter().enumerate() {
            old_leaf.write_leaf_cell(i, cell);
        }
        old_leaf.set_leaf_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT);
        old_leaf.set_leaf_next(new_page_num);

        debug!(
            left = old_page_num,
            right = new_page_num,
            separator_key,
            "split leaf"
        );
        Ok(SplitResult {
            left: old_page_num,
            separator_key,
            right: new_page_num,
        })
    }

    /// Registers `split` in the parent of its left node, splitting internal
    /// nodes upwards for as long as they overflow.
    fn insert_into_parent(&mut self, mut split: SplitResult) -> Result<(), DatabaseError> {
        let max_depth = self.max_depth();
        for _ in 0..=max_depth {
            let (left_is_root, parent_page_num) = {
                let left = self.pager.page(split.left)?;
                (left.is_root(), left.parent())
            };
            if left_is_root {
                return self.create_new_root(split);
            }

            let parent = self.pager.page(parent_page_num)?;
            if parent.page_type()? != PageType::InteriorTable {
                return Err(DatabaseError::CorruptedPage {
                    page_num: parent_page_num,
                    reason: format!("Parent of page {} is not an internal node", split.left),
                });
            }
            let (mut keys, mut children) = parent.internal_entries();
            let index = children
                .iter()
                .position(|&child| child == split.left)
                .ok_or_else(|| DatabaseError::CorruptedPage {
                    page_num: parent_page_num,
                    reason: format!("Page {} is missing from its parent", split.left),
                })?;
            keys.insert(index, split.separator_key);
            children.insert(index + 1, split.right);
            self.pager.page_mut(split.right)?.set_parent(parent_page_num);

            if keys.len() <= self.internal_max_keys {
                return self
                    .pager
                    .page_mut(parent_page_num)?
                    .write_internal_entries(&keys, &children);
            }
            split = self.split_internal(parent_page_num, &keys, &children)?;
        }
        Err(DatabaseError::CorruptedDatabase {
            reason: format!("Split cascade longer than {} levels", max_depth),
        })
    }

    /// Splits an overflowing internal node around its median key. The median
    /// is promoted; it is kept in neither half.
    fn split_internal(
        &mut self,
        page_num: PageNum,
        keys: &[Key],
        children: &[PageNum],
    ) -> Result<SplitResult, DatabaseError> {
        let mid = keys.len() / 2;
        let separator_key = keys[mid];
        let parent = self.pager.page(page_num)?.parent();

        let new_page_num = self.pager.allocate_page()?;
        let new_node = self.pager.page_mut(new_page_num)?;
        new_node.init_internal();
        new_node.set_parent(parent);
        new_node.write_internal_entries(&keys[mid + 1..], &children[mid + 1..])?;

        self.pager
            .page_mut(page_num)?
            .write_internal_entries(&keys[..mid], &children[..=mid])?;
        for &child in &children[mid + 1..] {
            self.pager.page_mut(child)?.set_parent(new_page_num);
        }

        debug!(
            left = page_num,
            right = new_page_num,
            separator_key,
            "split internal node"
        );
        Ok(SplitResult {
            left: page_num,
            separator_key,
            right: new_page_num,
        })
    }

    /// Moves the root's content into a new left child and turns the root page
    /// into an internal node over that child and `split.right`.
    fn create_new_root(&mut self, split: SplitResult) -> Result<(), DatabaseError> {
        let root_page_num = self.root_page_num;
        let left_child_page_num = self.pager.allocate_page()?;

        let mut left_child = self.pager.page(root_page_num)?.clone();
        left_child.set_root(false);
        left_child.set_parent(root_page_num);
        let moved_children = match left_child.page_type()? {
            PageType::InteriorTable => left_child.internal_entries().1,
            PageType::LeafTable => Vec::new(),
        };
        *self.pager.page_mut(left_child_page_num)? = left_child;
        self.pager.page_mut(left_child_page_num)?.is_dirty = true;
        for child in moved_children {
            self.pager.page_mut(child)?.set_parent(left_child_page_num);
        }
        self.pager.page_mut(split.right)?.set_parent(root_page_num);

        let root = self.pager.page_mut(root_page_num)?;
        root.init_internal();
        root.set_root(true);
        root.set_parent(0);
        root.write_internal_entries(&[split.separator_key], &[left_child_page_num, split.right])?;

        debug!(
            root = root_page_num,
            left = left_child_page_num,
            right = split.right,
            "created new root"
        );
        Ok(())
    }

    /// Page number of the leftmost leaf, where ascending scans start.
    pub fn leftmost_leaf(&mut self) -> Result<PageNum, DatabaseError> {
        let max_depth = self.max_depth();
        let mut page_num = self.root_page_num;
        for _ in 0..=max_depth {
            let page = self.pager.page(page_num)?;
            match page.page_type()? {
                PageType::LeafTable => return Ok(page_num),
                PageType::InteriorTable => page_num = page.internal_child(0),
            }
        }
        Err(DatabaseError::CorruptedDatabase {
            reason: format!("Tree is deeper than {} levels", max_depth),
        })
    }

    /// Number of levels from the root to the leaves (1 for a lone root leaf).
    pub fn depth(&mut self) -> Result<usize, DatabaseError> {
        let max_depth = self.max_depth();
        let mut page_num = self.root_page_num;
        for depth in 1..=max_depth as usize {
            let page = self.pager.page(page_num)?;
            match page.page_type()? {
                PageType::LeafTable => return Ok(depth),
                PageType::InteriorTable => page_num = page.internal_child(0),
            }
        }
        Err(DatabaseError::CorruptedDatabase {
            reason: format!("Tree is deeper than {} levels", max_depth),
        })
    }

    /// Lazily yields every row in ascending id order. Each call starts over
    /// from the leftmost leaf.
    pub fn scan_ascending(&mut self) -> ScanIterator<SequentialScanner<'_>> {
        ScanIterator::new(SequentialScanner::new(self))
    }

    /// Renders the tree structure, one node or key per line.
    pub fn debug_dump(&mut self) -> Result<String, DatabaseError> {
        let mut output = String::from("Tree:\n");
        self.dump_node(self.root_page_num, 0, &mut output)?;
        Ok(output)
    }

    fn dump_node(
        &mut self,
        page_num: PageNum,
        level: usize,
        output: &mut String,
    ) -> Result<(), DatabaseError> {
        if level > self.max_depth() as usize {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("Tree is deeper than {} levels", self.max_depth()),
            });
        }

        let indent = "  ".repeat(level);
        let page = self.pager.page(page_num)?;
        match page.page_type()? {
            PageType::LeafTable => {
                let num_cells = page.leaf_num_cells();
                output.push_str(&format!("{}- leaf (size {})\n", indent, num_cells));
                for i in 0..num_cells {
                    output.push_str(&format!("{}  - {}\n", indent, page.leaf_key(i)));
                }
            }
            PageType::InteriorTable => {
                let (keys, children) = page.internal_entries();
                output.push_str(&format!("{}- internal (size {})\n", indent, keys.len()));
                for (key, child) in keys.iter().zip(&children) {
                    self.dump_node(*child, level + 1, output)?;
                    output.push_str(&format!("{}  - key {}\n", indent, key));
                }
                if let Some(&right_child) = children.last() {
                    self.dump_node(right_child, level + 1, output)?;
                }
            }
        }
        Ok(())
    }
}
