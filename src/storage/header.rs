use bincode::{Decode, Encode, config};

use crate::{
    storage::{CQLITE_FORMAT_VERSION, CQLITE_MAGIC},
    types::{
        PAGE_SIZE, PageNum, ROOT_PAGE_NUM,
        error::DatabaseError,
        page::{INTERNAL_NODE_MAX_KEYS, MIN_INTERNAL_MAX_KEYS},
    },
    utils::hash::{calculate_header_checksum, verify_header_checksum},
};

const CHECKSUM_SIZE: usize = std::mem::size_of::<u32>();

/// Contents of page 0.
///
/// The header is encoded with fixed-width little-endian integers and followed
/// by a CRC32 of the encoded bytes. The rest of the page is zero.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DatabaseHeader {
    pub magic: [u8; 8],
    pub format_version: u32,
    pub page_size: u32,
    pub root_page_num: PageNum,
    pub page_count: u32,
    pub internal_max_keys: u32,
}

impl Default for DatabaseHeader {
    fn default() -> Self {
        Self {
            magic: *CQLITE_MAGIC,
            format_version: CQLITE_FORMAT_VERSION,
            page_size: PAGE_SIZE as u32,
            root_page_num: ROOT_PAGE_NUM,
            page_count: 1,
            internal_max_keys: INTERNAL_NODE_MAX_KEYS as u32,
        }
    }
}

fn header_config() -> impl config::Config {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

impl DatabaseHeader {
    pub fn new(internal_max_keys: u32) -> Self {
        Self {
            internal_max_keys,
            ..Self::default()
        }
    }

    /// Encodes the header into a full page.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DatabaseError> {
        let encoded = bincode::encode_to_vec(self, header_config()).map_err(|e| {
            DatabaseError::SerializationError {
                details: format!("Failed to encode header: {}", e),
            }
        })?;
        let checksum = calculate_header_checksum(&encoded);

        let mut buffer = vec![0u8; PAGE_SIZE];
        buffer[..encoded.len()].copy_from_slice(&encoded);
        buffer[encoded.len()..encoded.len() + CHECKSUM_SIZE]
            .copy_from_slice(&checksum.to_le_bytes());
        Ok(buffer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() < PAGE_SIZE {
            return Err(DatabaseError::CorruptedDatabase {
                reason: "Header page too short".to_string(),
            });
        }

        let (header, consumed): (Self, usize) =
            bincode::decode_from_slice(bytes, header_config()).map_err(|e| {
                DatabaseError::CorruptedDatabase {
                    reason: format!("Unreadable header: {}", e),
                }
            })?;

        if &header.magic != CQLITE_MAGIC {
            return Err(DatabaseError::CorruptedDatabase {
                reason: "Invalid cqlite magic number".to_string(),
            });
        }

        let stored_checksum = u32::from_le_bytes([
            bytes[consumed],
            bytes[consumed + 1],
            bytes[consumed + 2],
            bytes[consumed + 3],
        ]);
        if !verify_header_checksum(&bytes[..consumed], stored_checksum) {
            return Err(DatabaseError::CorruptedDatabase {
                reason: "Header checksum mismatch".to_string(),
            });
        }

        if header.format_version != CQLITE_FORMAT_VERSION {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("Unsupported file format version {}", header.format_version),
            });
        }
        if header.page_size != PAGE_SIZE as u32 {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("Unsupported page size: {}", header.page_size),
            });
        }
        if header.internal_max_keys < MIN_INTERNAL_MAX_KEYS
            || header.internal_max_keys as usize > INTERNAL_NODE_MAX_KEYS
        {
            return Err(DatabaseError::CorruptedDatabase {
                reason: format!("Invalid internal fan-out: {}", header.internal_max_keys),
            });
        }

        Ok(header)
    }
}
