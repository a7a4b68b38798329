//! Ciphertext envelope codec.
//!
//! Wire format (big-endian):
//! [4 bytes: extension length L (u32 BE)][L bytes: extension UTF-8][16 bytes: IV][N bytes: ciphertext]
//! N is a positive multiple of 16. There is no version byte and no authentication tag.

use crate::error::SealError;
use crate::types::{BLOCK_SIZE, CBC_IV_LENGTH, EXTENSION_LENGTH_PREFIX, MAX_EXTENSION_LENGTH};

/// Parsed `.enc` artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiphertextEnvelope {
    pub extension: String,
    pub iv: [u8; CBC_IV_LENGTH],
    pub ciphertext: Vec<u8>,
}

impl CiphertextEnvelope {
    /// Serialize to the on-disk layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SealError> {
        encode_envelope(&self.extension, &self.iv, &self.ciphertext)
    }

    /// Parse the on-disk layout.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SealError> {
        decode_envelope(data)
    }
}

/// Encode envelope parts into the wire format.
///
/// # Arguments
/// * `extension` - Extension tag, at most 65535 bytes of UTF-8
/// * `iv` - 16-byte CBC IV
/// * `ciphertext` - CBC output, a positive multiple of 16 bytes
pub fn encode_envelope(
    extension: &str,
    iv: &[u8; CBC_IV_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>, SealError> {
    let ext_bytes = extension.as_bytes();
    if ext_bytes.len() > MAX_EXTENSION_LENGTH {
        return Err(SealError::InvalidEnvelope(format!(
            "extension is {} bytes, max {}",
            ext_bytes.len(),
            MAX_EXTENSION_LENGTH
        )));
    }
    check_ciphertext_length(ciphertext.len())?;

    let mut out = Vec::with_capacity(
        EXTENSION_LENGTH_PREFIX + ext_bytes.len() + CBC_IV_LENGTH + ciphertext.len(),
    );
    out.extend_from_slice(&(ext_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(ext_bytes);
    out.extend_from_slice(iv);
    out.extend_from_slice(ciphertext);
    Ok(out)
}

/// Decode wire-format bytes into envelope parts.
pub fn decode_envelope(data: &[u8]) -> Result<CiphertextEnvelope, SealError> {
    if data.len() < EXTENSION_LENGTH_PREFIX {
        return Err(SealError::InvalidEnvelope(format!(
            "envelope too short: {} bytes",
            data.len()
        )));
    }

    let (prefix, rest) = data.split_at(EXTENSION_LENGTH_PREFIX);
    let ext_len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if ext_len > MAX_EXTENSION_LENGTH {
        return Err(SealError::InvalidEnvelope(format!(
            "extension length {} exceeds max {}",
            ext_len, MAX_EXTENSION_LENGTH
        )));
    }
    if rest.len() < ext_len + CBC_IV_LENGTH {
        return Err(SealError::InvalidEnvelope(format!(
            "claimed extension length {} leaves no room for IV in {} bytes",
            ext_len,
            rest.len()
        )));
    }

    let (ext_bytes, rest) = rest.split_at(ext_len);
    let extension = std::str::from_utf8(ext_bytes)
        .map_err(|e| SealError::InvalidEnvelope(format!("extension is not UTF-8: {}", e)))?
        .to_string();

    let (iv_bytes, ciphertext) = rest.split_at(CBC_IV_LENGTH);
    check_ciphertext_length(ciphertext.len())?;

    let mut iv = [0u8; CBC_IV_LENGTH];
    iv.copy_from_slice(iv_bytes);

    Ok(CiphertextEnvelope {
        extension,
        iv,
        ciphertext: ciphertext.to_vec(),
    })
}

fn check_ciphertext_length(len: usize) -> Result<(), SealError> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(SealError::InvalidEnvelope(format!(
            "ciphertext length {} is not a positive multiple of {}",
            len, BLOCK_SIZE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_iv() -> [u8; CBC_IV_LENGTH] {
        let mut iv = [0u8; CBC_IV_LENGTH];
        for (i, b) in iv.iter_mut().enumerate() {
            *b = i as u8;
        }
        iv
    }

    #[test]
    fn layout_matches_wire_format() {
        let iv = sample_iv();
        let ciphertext = [0xCCu8; 16];
        let encoded = encode_envelope(".pdf", &iv, &ciphertext).unwrap();

        assert_eq!(encoded.len(), 4 + 4 + 16 + 16);
        assert_eq!(&encoded[..4], &[0, 0, 0, 4]);
        assert_eq!(&encoded[4..8], b".pdf");
        assert_eq!(&encoded[8..24], &iv);
        assert_eq!(&encoded[24..], &ciphertext);
    }

    #[test]
    fn length_prefix_is_big_endian() {
        let ext = "x".repeat(0x0102);
        let encoded = encode_envelope(&ext, &sample_iv(), &[0u8; 16]).unwrap();
        assert_eq!(&encoded[..4], &[0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn decode_recovers_parts() {
        let iv = sample_iv();
        let ciphertext: Vec<u8> = (0..48).collect();
        let encoded = encode_envelope(".docx", &iv, &ciphertext).unwrap();
        let decoded = decode_envelope(&encoded).unwrap();
        assert_eq!(decoded.extension, ".docx");
        assert_eq!(decoded.iv, iv);
        assert_eq!(decoded.ciphertext, ciphertext);
    }

    #[test]
    fn empty_extension() {
        let encoded = encode_envelope("", &sample_iv(), &[1u8; 32]).unwrap();
        assert_eq!(encoded.len(), 4 + 16 + 32);
        let decoded = CiphertextEnvelope::from_bytes(&encoded).unwrap();
        assert!(decoded.extension.is_empty());
        assert_eq!(decoded.to_bytes().unwrap(), encoded);
    }

    #[test]
    fn rejects_oversized_extension() {
        let ext = "a".repeat(MAX_EXTENSION_LENGTH + 1);
        assert!(encode_envelope(&ext, &sample_iv(), &[0u8; 16]).is_err());
    }

    #[test]
    fn rejects_unaligned_ciphertext_on_encode() {
        assert!(encode_envelope(".pdf", &sample_iv(), &[0u8; 15]).is_err());
        assert!(encode_envelope(".pdf", &sample_iv(), &[]).is_err());
    }

    #[test]
    fn rejects_truncated_prefix() {
        let err = decode_envelope(&[0, 0, 1]).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn rejects_length_past_end() {
        let mut data = vec![0u8; 40];
        data[..4].copy_from_slice(&1000u32.to_be_bytes());
        assert!(matches!(
            decode_envelope(&data),
            Err(SealError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn rejects_huge_length_without_overflow() {
        let mut data = vec![0u8; 40];
        data[..4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(decode_envelope(&data).is_err());
    }

    #[test]
    fn rejects_missing_ciphertext() {
        let encoded = encode_envelope(".pdf", &sample_iv(), &[0u8; 16]).unwrap();
        assert!(decode_envelope(&encoded[..24]).is_err());
    }

    #[test]
    fn rejects_unaligned_ciphertext_on_decode() {
        let mut encoded = encode_envelope(".pdf", &sample_iv(), &[0u8; 16]).unwrap();
        encoded.push(0);
        assert!(decode_envelope(&encoded).is_err());
    }

    #[test]
    fn rejects_non_utf8_extension() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(&[0u8; 32]);
        let err = decode_envelope(&data).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
