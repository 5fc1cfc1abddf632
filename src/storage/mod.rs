pub mod bplus_tree;
pub mod header;
pub mod pager;

const CQLITE_MAGIC: &[u8; 8] = b"CQLITE\0\0";
const CQLITE_FORMAT_VERSION: u32 = 1;
