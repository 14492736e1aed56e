/// Computes the CRC32 checksum for the given data.
///
/// Standard reflected CRC-32 (polynomial 0xEDB88320, init 0xFFFFFFFF,
/// final complement). The empty input yields 0.
pub fn compute_crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::compute_crc32;

    #[test]
    fn reference_vectors() {
        assert_eq!(compute_crc32(b""), 0);
        assert_eq!(compute_crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(compute_crc32(&[0x48, 0x65, 0x6C, 0x6C, 0x6F]), 0xF7D1_8982);
        assert_eq!(compute_crc32(b"hello"), 0x3610_A686);
    }

    #[test]
    fn deterministic() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        assert_eq!(compute_crc32(&data), compute_crc32(&data.clone()));
        assert_ne!(compute_crc32(&data[..4095]), compute_crc32(&data));
    }
}
