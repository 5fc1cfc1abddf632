use std::fmt;

use crate::types::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE,
    ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE, error::DatabaseError,
};

/// The single row shape of the table.
///
/// On disk a row always takes [`ROW_SIZE`] bytes:
///
/// ```text
/// ┌──────────────┬─────────────────────────┬──────────────────────────┐
/// │ id (4, LE)   │ username (32, 0-padded) │ email (255, 0-padded)    │
/// └──────────────┴─────────────────────────┴──────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Checks that both text columns fit their fixed slots.
    pub fn validate(&self) -> Result<(), DatabaseError> {
        check_width("username", &self.username, COLUMN_USERNAME_SIZE)?;
        check_width("email", &self.email, COLUMN_EMAIL_SIZE)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<[u8; ROW_SIZE], DatabaseError> {
        let mut buffer = [0u8; ROW_SIZE];
        self.serialize_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Writes the row into `destination`, which must be at least [`ROW_SIZE`] bytes.
    pub fn serialize_into(&self, destination: &mut [u8]) -> Result<(), DatabaseError> {
        self.validate()?;
        if destination.len() < ROW_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "Row buffer too small: expected {} bytes, got {}",
                    ROW_SIZE,
                    destination.len()
                ),
            });
        }

        destination[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        write_padded(
            &mut destination[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            self.username.as_bytes(),
        );
        write_padded(
            &mut destination[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            self.email.as_bytes(),
        );
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() < ROW_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "Incomplete row: expected {} bytes, got {}",
                    ROW_SIZE,
                    bytes.len()
                ),
            });
        }

        let id = u32::from_le_bytes([
            bytes[ID_OFFSET],
            bytes[ID_OFFSET + 1],
            bytes[ID_OFFSET + 2],
            bytes[ID_OFFSET + 3],
        ]);
        let username = read_padded(
            "username",
            &bytes[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
        )?;
        let email = read_padded("email", &bytes[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE])?;

        Ok(Row {
            id,
            username,
            email,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.id, self.username, self.email)
    }
}

fn check_width(column: &'static str, value: &str, max: usize) -> Result<(), DatabaseError> {
    if value.len() > max {
        return Err(DatabaseError::ValueTooLong {
            column,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

fn write_padded(slot: &mut [u8], value: &[u8]) {
    slot[..value.len()].copy_from_slice(value);
    slot[value.len()..].fill(0);
}

fn read_padded(column: &str, slot: &[u8]) -> Result<String, DatabaseError> {
    let end = slot.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8(slot[..end].to_vec()).map_err(|e| DatabaseError::SerializationError {
        details: format!("Column '{}' is not valid UTF-8: {}", column, e),
    })
}
