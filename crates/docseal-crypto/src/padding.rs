//! PKCS#7 block padding.
//!
//! Format: `[data][p bytes of value p]` with `p` in `1..=block_size`.
//! A block-aligned input always gains one full block so removal is unambiguous.

use crate::error::SealError;
use crate::types::BLOCK_SIZE;

/// Pad data to a multiple of [`BLOCK_SIZE`].
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Validate and strip PKCS#7 padding.
///
/// Reads the last byte as `p`, requires `1 <= p <= BLOCK_SIZE` and the last
/// `p` bytes all equal to `p`.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], SealError> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(SealError::Padding(format!(
            "padded length {} is not a positive multiple of {}",
            data.len(),
            BLOCK_SIZE
        )));
    }

    let pad_len = data[data.len() - 1] as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE {
        return Err(SealError::Padding(format!(
            "pad length {} out of range",
            pad_len
        )));
    }

    let (body, pad) = data.split_at(data.len() - pad_len);
    if pad.iter().any(|&b| b as usize != pad_len) {
        return Err(SealError::Padding("inconsistent pad bytes".to_string()));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_unpad_round_trip() {
        let data = b"hello world";
        let padded = pkcs7_pad(data);
        assert_eq!(pkcs7_unpad(&padded).unwrap(), data);
    }

    #[test]
    fn empty_input_gets_full_block() {
        let padded = pkcs7_pad(b"");
        assert_eq!(padded, vec![16u8; 16]);
        assert!(pkcs7_unpad(&padded).unwrap().is_empty());
    }

    #[test]
    fn aligned_input_gets_extra_block() {
        let data = [0xAAu8; 16];
        let padded = pkcs7_pad(&data);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn pad_length_matches_remainder() {
        let padded = pkcs7_pad(&[0u8; 13]);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[13..], &[3, 3, 3]);
    }

    #[test]
    fn output_is_always_block_multiple() {
        for len in 0..=48 {
            let padded = pkcs7_pad(&vec![7u8; len]);
            assert_eq!(padded.len() % BLOCK_SIZE, 0);
            assert!(padded.len() > len);
            assert!(padded.len() - len <= BLOCK_SIZE);
        }
    }

    #[test]
    fn rejects_zero_pad_byte() {
        let mut block = [1u8; 16];
        block[15] = 0;
        assert!(matches!(pkcs7_unpad(&block), Err(SealError::Padding(_))));
    }

    #[test]
    fn rejects_pad_byte_over_block_size() {
        let block = [17u8; 16];
        assert!(matches!(pkcs7_unpad(&block), Err(SealError::Padding(_))));
    }

    #[test]
    fn rejects_inconsistent_pad_bytes() {
        let mut block = [4u8; 16];
        block[13] = 9;
        assert!(matches!(pkcs7_unpad(&block), Err(SealError::Padding(_))));
    }

    #[test]
    fn rejects_unaligned_and_empty_input() {
        assert!(pkcs7_unpad(&[]).is_err());
        assert!(pkcs7_unpad(&[1u8; 15]).is_err());
    }
}
