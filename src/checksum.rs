//! Additive checksums over little-endian words.
//!
//! Every creature record stores a 16-bit sum of the 16-bit words of its
//! payload region. The 32-bit variant is the primitive generation III save
//! sections use for their own checksums; it is exposed here because it
//! shares the word walk.

use byteorder::{ByteOrder, LittleEndian};

/// Sum the little-endian `u16` words of `data[start..end]` with wraparound.
///
/// A trailing odd byte is ignored; every record payload is word aligned.
pub fn additive_checksum16(data: &[u8], start: usize, end: usize) -> u16 {
    data[start..end]
        .chunks_exact(2)
        .fold(0u16, |acc, w| acc.wrapping_add(LittleEndian::read_u16(w)))
}

/// Sum the little-endian `u32` words of `data[start..end]` with wraparound.
pub fn additive_checksum32(data: &[u8], start: usize, end: usize) -> u32 {
    data[start..end]
        .chunks_exact(4)
        .fold(0u32, |acc, w| acc.wrapping_add(LittleEndian::read_u32(w)))
}

/// Fold a 32-bit section sum into the 16-bit value generation III stores.
pub fn fold_checksum32(sum: u32) -> u16 {
    ((sum >> 16) as u16).wrapping_add(sum as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum16_wraps() {
        let data = [0xFF, 0xFF, 0x02, 0x00];
        assert_eq!(additive_checksum16(&data, 0, 4), 0x0001);
    }

    #[test]
    fn test_checksum16_respects_bounds() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x04, 0x00];
        assert_eq!(additive_checksum16(&data, 2, 6), 6);
        assert_eq!(additive_checksum16(&data, 0, 0), 0);
    }

    #[test]
    fn test_checksum32_and_fold() {
        let data = [0x01, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        let sum = additive_checksum32(&data, 0, 8);
        assert_eq!(sum, 0x0001_0003);
        assert_eq!(fold_checksum32(sum), 4);
    }
}
