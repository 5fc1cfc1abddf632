use crate::types::{Key, PAGE_SIZE, PageNum, ROW_SIZE, error::DatabaseError, row::Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    InteriorTable = 5,
    LeafTable = 13,
}

impl PageType {
    pub fn from_u8(value: u8) -> Result<Self, DatabaseError> {
        match value {
            5 => Ok(PageType::InteriorTable),
            13 => Ok(PageType::LeafTable),
            _ => Err(DatabaseError::InvalidPageType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            PageType::InteriorTable => 5,
            PageType::LeafTable => 13,
        }
    }
}

/*
 * Common Node Header (6 bytes)
 * ┌──────────────┬──────────────┬───────────────────────┐
 * │ page_type(1) │ is_root(1)   │ parent_page_num(4)    │
 * └──────────────┴──────────────┴───────────────────────┘
 */
pub const NODE_TYPE_OFFSET: usize = 0;
pub const NODE_TYPE_SIZE: usize = std::mem::size_of::<u8>();
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
pub const IS_ROOT_SIZE: usize = std::mem::size_of::<u8>();
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const PARENT_POINTER_SIZE: usize = std::mem::size_of::<u32>();
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

/*
 * Leaf Node Layout
 * ┌─────────────────────────────────────────────────────────────────┐
 * │ common header(6) | num_cells(4) | next_leaf(4)                  │
 * ├─────────────────────────────────────────────────────────────────┤
 * │ [key 0 (4) | row 0 (291)] [key 1 | row 1] ... [key 12 | row 12] │
 * ├─────────────────────────────────────────────────────────────────┤
 * │ unused tail (247 bytes)                                         │
 * └─────────────────────────────────────────────────────────────────┘
 * next_leaf == 0 means "no right sibling" (page 0 is never a leaf).
 */
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_NEXT_LEAF_OFFSET: usize = LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE;
pub const LEAF_NODE_NEXT_LEAF_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE + LEAF_NODE_NEXT_LEAF_SIZE;

pub const LEAF_NODE_KEY_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

/*
 * Internal Node Layout
 * ┌─────────────────────────────────────────────────────────────────┐
 * │ common header(6) | num_keys(4) | right_child(4)                 │
 * ├─────────────────────────────────────────────────────────────────┤
 * │ [child 0 (4) | key 0 (4)] [child 1 | key 1] ...                 │
 * └─────────────────────────────────────────────────────────────────┘
 * Every key in the subtree of child i is < key i. The right child holds
 * everything >= the last key.
 */
pub const INTERNAL_NODE_NUM_KEYS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const INTERNAL_NODE_NUM_KEYS_SIZE: usize = std::mem::size_of::<u32>();
pub const INTERNAL_NODE_RIGHT_CHILD_OFFSET: usize =
    INTERNAL_NODE_NUM_KEYS_OFFSET + INTERNAL_NODE_NUM_KEYS_SIZE;
pub const INTERNAL_NODE_RIGHT_CHILD_SIZE: usize = std::mem::size_of::<u32>();
pub const INTERNAL_NODE_HEADER_SIZE: usize =
    COMMON_NODE_HEADER_SIZE + INTERNAL_NODE_NUM_KEYS_SIZE + INTERNAL_NODE_RIGHT_CHILD_SIZE;

pub const INTERNAL_NODE_CHILD_SIZE: usize = std::mem::size_of::<u32>();
pub const INTERNAL_NODE_KEY_SIZE: usize = std::mem::size_of::<u32>();
pub const INTERNAL_NODE_CELL_SIZE: usize = INTERNAL_NODE_CHILD_SIZE + INTERNAL_NODE_KEY_SIZE;
pub const INTERNAL_NODE_MAX_KEYS: usize =
    (PAGE_SIZE - INTERNAL_NODE_HEADER_SIZE) / INTERNAL_NODE_CELL_SIZE;
/// Smallest configurable fan-out; a split needs a median plus one key per half.
pub const MIN_INTERNAL_MAX_KEYS: u32 = 2;

/// One page-sized buffer interpreted as a B-tree node.
///
/// The page never owns references to other pages; parent, sibling and child
/// links are plain page numbers resolved through the pager.
#[derive(Debug, Clone)]
pub struct Page {
    pub data: Box<[u8; PAGE_SIZE]>,
    pub is_dirty: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A zero-filled page.
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
            is_dirty: false,
        }
    }

    pub fn new_leaf() -> Self {
        let mut page = Self::new();
        page.init_leaf();
        page
    }

    pub fn new_internal() -> Self {
        let mut page = Self::new();
        page.init_internal();
        page
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() != PAGE_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "Invalid page size: expected {} bytes, got {}",
                    PAGE_SIZE,
                    bytes.len()
                ),
            });
        }
        let mut page = Self::new();
        page.data.copy_from_slice(bytes);
        Ok(page)
    }

    /// Rejects a node whose cell count does not fit in the page.
    pub fn check_cell_count(&self, page_num: PageNum) -> Result<(), DatabaseError> {
        let (count, max) = match PageType::from_u8(self.data[NODE_TYPE_OFFSET]) {
            Ok(PageType::LeafTable) => (self.leaf_num_cells(), LEAF_NODE_MAX_CELLS),
            Ok(PageType::InteriorTable) => (self.internal_num_keys(), INTERNAL_NODE_MAX_KEYS),
            // untyped pages are reported by whoever interprets them
            Err(_) => return Ok(()),
        };
        if count > max {
            return Err(DatabaseError::CorruptedPage {
                page_num,
                reason: format!("Node claims {} cells, at most {} fit", count, max),
            });
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    fn read_u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self.is_dirty = true;
    }

    // Common header

    pub fn page_type(&self) -> Result<PageType, DatabaseError> {
        PageType::from_u8(self.data[NODE_TYPE_OFFSET])
    }

    pub fn set_page_type(&mut self, page_type: PageType) {
        self.data[NODE_TYPE_OFFSET] = page_type.as_u8();
        self.is_dirty = true;
    }

    pub fn is_root(&self) -> bool {
        self.data[IS_ROOT_OFFSET] != 0
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.data[IS_ROOT_OFFSET] = is_root as u8;
        self.is_dirty = true;
    }

    pub fn parent(&self) -> PageNum {
        self.read_u32(PARENT_POINTER_OFFSET)
    }

    pub fn set_parent(&mut self, parent: PageNum) {
        self.write_u32(PARENT_POINTER_OFFSET, parent);
    }

    // Leaf nodes

    pub fn init_leaf(&mut self) {
        self.data.fill(0);
        self.set_page_type(PageType::LeafTable);
        self.set_root(false);
        self.set_leaf_num_cells(0);
        self.set_leaf_next(0);
    }

    pub fn leaf_num_cells(&self) -> usize {
        self.read_u32(LEAF_NODE_NUM_CELLS_OFFSET) as usize
    }

    pub fn set_leaf_num_cells(&mut self, num_cells: usize) {
        self.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, num_cells as u32);
    }

    pub fn leaf_next(&self) -> PageNum {
        self.read_u32(LEAF_NODE_NEXT_LEAF_OFFSET)
    }

    pub fn set_leaf_next(&mut self, next: PageNum) {
        self.write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, next);
    }

    fn leaf_cell_offset(cell_num: usize) -> usize {
        LEAF_NODE_HEADER_SIZE + cell_num * LEAF_NODE_CELL_SIZE
    }

    pub fn leaf_cell(&self, cell_num: usize) -> &[u8] {
        let start = Self::leaf_cell_offset(cell_num);
        &self.data[start..start + LEAF_NODE_CELL_SIZE]
    }

    pub fn leaf_key(&self, cell_num: usize) -> Key {
        self.read_u32(Self::leaf_cell_offset(cell_num))
    }

    pub fn leaf_value(&self, cell_num: usize) -> &[u8] {
        let start = Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_SIZE;
        &self.data[start..start + LEAF_NODE_VALUE_SIZE]
    }

    pub fn leaf_row(&self, cell_num: usize) -> Result<Row, DatabaseError> {
        Row::from_bytes(self.leaf_value(cell_num))
    }

    /// Overwrites cell `cell_num` with a raw `key + row` cell.
    pub fn write_leaf_cell(&mut self, cell_num: usize, cell: &[u8]) {
        let start = Self::leaf_cell_offset(cell_num);
        self.data[start..start + LEAF_NODE_CELL_SIZE].copy_from_slice(cell);
        self.is_dirty = true;
    }

    /// Inserts a cell at `cell_num`, shifting the following cells right.
    /// The caller guarantees there is room for one more cell.
    pub fn leaf_insert_cell(&mut self, cell_num: usize, cell: &[u8]) {
        let num_cells = self.leaf_num_cells();
        if cell_num < num_cells {
            let start = Self::leaf_cell_offset(cell_num);
            let end = Self::leaf_cell_offset(num_cells);
            self.data
                .copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }
        self.write_leaf_cell(cell_num, cell);
        self.set_leaf_num_cells(num_cells + 1);
    }

    /// Binary search for `key`: the index where it is stored, or where it belongs.
    pub fn leaf_find(&self, key: Key) -> usize {
        let mut min_index = 0;
        let mut one_past_max_index = self.leaf_num_cells();
        while one_past_max_index != min_index {
            let index = (min_index + one_past_max_index) / 2;
            let key_at_index = self.leaf_key(index);
            if key == key_at_index {
                return index;
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        min_index
    }

    // Internal nodes

    pub fn init_internal(&mut self) {
        self.data.fill(0);
        self.set_page_type(PageType::InteriorTable);
        self.set_root(false);
        self.set_internal_num_keys(0);
        self.set_internal_right_child(0);
    }

    pub fn internal_num_keys(&self) -> usize {
        self.read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET) as usize
    }

    pub fn set_internal_num_keys(&mut self, num_keys: usize) {
        self.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, num_keys as u32);
    }

    pub fn internal_right_child(&self) -> PageNum {
        self.read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET)
    }

    pub fn set_internal_right_child(&mut self, child: PageNum) {
        self.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, child);
    }

    fn internal_cell_offset(cell_num: usize) -> usize {
        INTERNAL_NODE_HEADER_SIZE + cell_num * INTERNAL_NODE_CELL_SIZE
    }

    pub fn internal_key(&self, key_num: usize) -> Key {
        self.read_u32(Self::internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE)
    }

    /// Child `child_num`; `child_num == num_keys` is the right child.
    pub fn internal_child(&self, child_num: usize) -> PageNum {
        if child_num >= self.internal_num_keys() {
            self.internal_right_child()
        } else {
            self.read_u32(Self::internal_cell_offset(child_num))
        }
    }

    /// Index of the child whose range contains `key`.
    pub fn internal_find_child(&self, key: Key) -> usize {
        let mut min_index = 0;
        let mut max_index = self.internal_num_keys();
        while min_index != max_index {
            let index = (min_index + max_index) / 2;
            if key < self.internal_key(index) {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        min_index
    }

    /// Keys and children (right child last) of an internal node.
    pub fn internal_entries(&self) -> (Vec<Key>, Vec<PageNum>) {
        let num_keys = self.internal_num_keys();
        let keys = (0..num_keys).map(|i| self.internal_key(i)).collect();
        let children = (0..=num_keys).map(|i| self.internal_child(i)).collect();
        (keys, children)
    }

    /// Rewrites the body of an internal node. `children.len()` must be `keys.len() + 1`.
    pub fn write_internal_entries(
        &mut self,
        keys: &[Key],
        children: &[PageNum],
    ) -> Result<(), DatabaseError> {
        if children.len() != keys.len() + 1 {
            return Err(DatabaseError::CorruptedPage {
                page_num: 0,
                reason: format!(
                    "Internal node needs {} children for {} keys, got {}",
                    keys.len() + 1,
                    keys.len(),
                    children.len()
                ),
            });
        }
        if keys.len() > INTERNAL_NODE_MAX_KEYS {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "Internal node holds at most {} keys, got {}",
                    INTERNAL_NODE_MAX_KEYS,
                    keys.len()
                ),
            });
        }

        let body_start = Self::internal_cell_offset(0);
        self.data[body_start..].fill(0);
        for (i, (key, child)) in keys.iter().zip(children).enumerate() {
            let offset = Self::internal_cell_offset(i);
            self.write_u32(offset, *child);
            self.write_u32(offset + INTERNAL_NODE_CHILD_SIZE, *key);
        }
        self.set_internal_num_keys(keys.len());
        self.set_internal_right_child(children[keys.len()]);
        Ok(())
    }
}
