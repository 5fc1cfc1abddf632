use cqlite::types::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, ROW_SIZE, USERNAME_OFFSET,
    error::DatabaseError, row::Row,
};

fn create_test_row() -> Row {
    Row::new(1, "user1", "person1@example.com")
}

#[test]
fn test_row_size_constant() {
    assert_eq!(ROW_SIZE, 291);
    assert_eq!(USERNAME_OFFSET, 4);
    assert_eq!(EMAIL_OFFSET, 36);
}

#[test]
fn test_row_layout_is_fixed_width() {
    let row = create_test_row();
    let bytes = row.to_bytes().unwrap();

    assert_eq!(bytes.len(), ROW_SIZE);
    assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
    assert_eq!(&bytes[USERNAME_OFFSET..USERNAME_OFFSET + 5], b"user1");
    assert!(bytes[USERNAME_OFFSET + 5..EMAIL_OFFSET].iter().all(|&b| b == 0));
    assert_eq!(
        &bytes[EMAIL_OFFSET..EMAIL_OFFSET + 19],
        b"person1@example.com"
    );
    assert!(bytes[EMAIL_OFFSET + 19..].iter().all(|&b| b == 0));
}

#[test]
fn test_row_deserialization_trims_padding() {
    let row = create_test_row();
    let bytes = row.to_bytes().unwrap();
    let decoded = Row::from_bytes(&bytes).unwrap();

    assert_eq!(decoded, row);
    assert_eq!(decoded.username.len(), 5);
}

#[test]
fn test_row_with_maximum_width_columns() {
    let username = "a".repeat(COLUMN_USERNAME_SIZE);
    let email = "b".repeat(COLUMN_EMAIL_SIZE);
    let row = Row::new(u32::MAX, username.clone(), email.clone());

    let decoded = Row::from_bytes(&row.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.id, u32::MAX);
    assert_eq!(decoded.username, username);
    assert_eq!(decoded.email, email);
}

#[test]
fn test_row_with_empty_columns() {
    let row = Row::new(0, "", "");
    let decoded = Row::from_bytes(&row.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, row);
}

#[test]
fn test_username_too_long() {
    let row = Row::new(1, "a".repeat(COLUMN_USERNAME_SIZE + 1), "a@b.c");
    match row.to_bytes() {
        Err(DatabaseError::ValueTooLong {
            column,
            max,
            actual,
        }) => {
            assert_eq!(column, "username");
            assert_eq!(max, COLUMN_USERNAME_SIZE);
            assert_eq!(actual, COLUMN_USERNAME_SIZE + 1);
        }
        other => panic!("Expected ValueTooLong, got {:?}", other),
    }
}

#[test]
fn test_email_too_long() {
    let row = Row::new(1, "user", "e".repeat(COLUMN_EMAIL_SIZE + 1));
    assert!(matches!(
        row.to_bytes(),
        Err(DatabaseError::ValueTooLong {
            column: "email",
            ..
        })
    ));
}

#[test]
fn test_length_is_measured_in_bytes() {
    // 11 three-byte characters: 33 bytes
    let row = Row::new(1, "€".repeat(11), "x@y.z");
    assert!(row.validate().is_err());

    let row = Row::new(1, "€".repeat(10), "x@y.z");
    let decoded = Row::from_bytes(&row.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.username, "€".repeat(10));
}

#[test]
fn test_serialize_into_short_buffer_fails() {
    let row = create_test_row();
    let mut buffer = [0u8; ROW_SIZE - 1];
    assert!(matches!(
        row.serialize_into(&mut buffer),
        Err(DatabaseError::SerializationError { .. })
    ));
}

#[test]
fn test_deserialize_short_buffer_fails() {
    let bytes = [0u8; ROW_SIZE - 1];
    assert!(matches!(
        Row::from_bytes(&bytes),
        Err(DatabaseError::SerializationError { .. })
    ));
}

#[test]
fn test_deserialize_invalid_utf8_fails() {
    let mut bytes = create_test_row().to_bytes().unwrap();
    bytes[USERNAME_OFFSET] = 0xFF;
    assert!(matches!(
        Row::from_bytes(&bytes),
        Err(DatabaseError::SerializationError { .. })
    ));
}

#[test]
fn test_row_display() {
    assert_eq!(
        create_test_row().to_string(),
        "(1 user1 person1@example.com)"
    );
}
