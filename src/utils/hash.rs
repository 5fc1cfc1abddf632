use crc32fast::Hasher;

/// CRC32 of an encoded database header.
pub fn calculate_header_checksum(header_bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(header_bytes);
    hasher.finalize()
}

pub fn verify_header_checksum(header_bytes: &[u8], expected_checksum: u32) -> bool {
    calculate_header_checksum(header_bytes) == expected_checksum
}
