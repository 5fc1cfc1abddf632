use cqlite::{
    storage::header::DatabaseHeader,
    types::{PAGE_SIZE, ROOT_PAGE_NUM, error::DatabaseError, page::INTERNAL_NODE_MAX_KEYS},
};

fn assert_corrupted(result: Result<DatabaseHeader, DatabaseError>) {
    match result {
        Err(DatabaseError::CorruptedDatabase { .. }) => {}
        other => panic!("Expected CorruptedDatabase, got {:?}", other),
    }
}

#[test]
fn test_default_header() {
    let header = DatabaseHeader::default();
    assert_eq!(&header.magic, b"CQLITE\0\0");
    assert_eq!(header.format_version, 1);
    assert_eq!(header.page_size, PAGE_SIZE as u32);
    assert_eq!(header.root_page_num, ROOT_PAGE_NUM);
    assert_eq!(header.page_count, 1);
    assert_eq!(header.internal_max_keys, INTERNAL_NODE_MAX_KEYS as u32);
}

#[test]
fn test_header_fills_one_page() {
    let bytes = DatabaseHeader::new(3).to_bytes().unwrap();
    assert_eq!(bytes.len(), PAGE_SIZE);
    assert_eq!(&bytes[..8], b"CQLITE\0\0");
    // fixed-width little-endian fields follow the magic
    assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
    assert_eq!(&bytes[12..16], &(PAGE_SIZE as u32).to_le_bytes());
    assert_eq!(&bytes[16..20], &1u32.to_le_bytes());
}

#[test]
fn test_header_roundtrip() {
    let mut header = DatabaseHeader::new(7);
    header.page_count = 42;

    let decoded = DatabaseHeader::from_bytes(&header.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn test_bad_magic_rejected() {
    let mut bytes = DatabaseHeader::default().to_bytes().unwrap();
    bytes[0] = b'X';
    assert_corrupted(DatabaseHeader::from_bytes(&bytes));
}

#[test]
fn test_checksum_mismatch_rejected() {
    let mut header = DatabaseHeader::default();
    header.page_count = 5;
    let mut bytes = header.to_bytes().unwrap();
    // page_count sits after magic, version, page size and root
    bytes[20] = 6;
    assert_corrupted(DatabaseHeader::from_bytes(&bytes));
}

#[test]
fn test_zeroed_page_rejected() {
    assert_corrupted(DatabaseHeader::from_bytes(&vec![0u8; PAGE_SIZE]));
}

#[test]
fn test_short_buffer_rejected() {
    let bytes = DatabaseHeader::default().to_bytes().unwrap();
    assert_corrupted(DatabaseHeader::from_bytes(&bytes[..100]));
}

#[test]
fn test_invalid_fan_out_rejected() {
    let bytes = DatabaseHeader::new(1).to_bytes().unwrap();
    assert_corrupted(DatabaseHeader::from_bytes(&bytes));

    let bytes = DatabaseHeader::new(INTERNAL_NODE_MAX_KEYS as u32 + 1)
        .to_bytes()
        .unwrap();
    assert_corrupted(DatabaseHeader::from_bytes(&bytes));
}

#[test]
fn test_wrong_page_size_rejected() {
    let mut header = DatabaseHeader::default();
    header.page_size = 8192;
    assert_corrupted(DatabaseHeader::from_bytes(&header.to_bytes().unwrap()));
}
