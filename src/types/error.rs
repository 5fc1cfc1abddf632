use thiserror::Error;

use crate::types::{Key, PageNum};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table full (max pages: {max_pages})")]
    TableFull { max_pages: u32 },

    #[error("Duplicate key {key}")]
    DuplicateKey { key: Key },

    #[error("Value for column '{column}' is too long: {actual} bytes (max: {max})")]
    ValueTooLong {
        column: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Corrupted page: page_num={page_num}, reason={reason}")]
    CorruptedPage { page_num: PageNum, reason: String },

    #[error("Corrupted database: {reason}")]
    CorruptedDatabase { reason: String },

    #[error("Invalid page type: {0}")]
    InvalidPageType(u8),

    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("Input error: {details}")]
    Input { details: String },
}

impl DatabaseError {
    /// Errors after which the session cannot keep running.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DatabaseError::DuplicateKey { .. } | DatabaseError::ValueTooLong { .. }
        )
    }
}
