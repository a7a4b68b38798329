//! Hybrid encryption: AES-256-CBC for file bytes, RSA-OAEP(SHA-256) for the key.
//!
//! Seal:  random key + IV → PKCS#7 pad → AES-256-CBC → envelope, OAEP(key) → wrapped key
//! Open:  parse envelope → OAEP unwrap → AES-256-CBC → strip PKCS#7
//!
//! The symmetric key is generated per call and zeroized before returning.
//! The envelope carries no authentication tag; padding is the only integrity check.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::envelope::{decode_envelope, encode_envelope};
use crate::error::SealError;
use crate::keys::{parse_private_key_pem, parse_public_key_pem};
use crate::padding::{pkcs7_pad, pkcs7_unpad};
use crate::types::{PlaintextRecord, SealedArtifacts, AES_KEY_LENGTH, CBC_IV_LENGTH};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generate a random 256-bit symmetric key.
pub fn generate_symmetric_key() -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, SealError> {
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    getrandom::getrandom(key.as_mut()).map_err(|e| SealError::RngFailed(e.to_string()))?;
    Ok(key)
}

/// Generate a random 16-byte CBC IV.
pub fn generate_iv() -> Result<[u8; CBC_IV_LENGTH], SealError> {
    let mut iv = [0u8; CBC_IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|e| SealError::RngFailed(e.to_string()))?;
    Ok(iv)
}

/// Wrap a symmetric key with RSA-OAEP (SHA-256 digest and MGF1, empty label).
///
/// # Returns
/// Wrapped key, exactly as long as the recipient's modulus (256 bytes for 2048-bit keys)
pub fn wrap_key(key: &[u8], recipient: &RsaPublicKey) -> Result<Vec<u8>, SealError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(SealError::Crypto(format!(
            "symmetric key must be {} bytes, got {}",
            AES_KEY_LENGTH,
            key.len()
        )));
    }
    recipient
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), key)
        .map_err(|e| SealError::Crypto(format!("RSA-OAEP wrap: {}", e)))
}

/// Unwrap a symmetric key with the recipient's private key.
pub fn unwrap_key(
    wrapped_key: &[u8],
    recipient: &RsaPrivateKey,
) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>, SealError> {
    if wrapped_key.len() != recipient.size() {
        return Err(SealError::Unwrap(format!(
            "wrapped key is {} bytes, recipient modulus is {}",
            wrapped_key.len(),
            recipient.size()
        )));
    }

    let unwrapped = Zeroizing::new(
        recipient
            .decrypt(Oaep::new::<Sha256>(), wrapped_key)
            .map_err(|e| SealError::Unwrap(format!("RSA-OAEP: {}", e)))?,
    );
    if unwrapped.len() != AES_KEY_LENGTH {
        return Err(SealError::Unwrap(format!(
            "unwrapped key is {} bytes, expected {}",
            unwrapped.len(),
            AES_KEY_LENGTH
        )));
    }

    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    key.copy_from_slice(&unwrapped);
    Ok(key)
}

/// Encrypt a plaintext record for a recipient.
///
/// # Arguments
/// * `record` - Extension tag and raw file bytes
/// * `recipient` - RSA public key used to wrap the fresh symmetric key
///
/// # Returns
/// The envelope and wrapped key. Nothing is returned on failure.
pub fn encrypt(
    record: &PlaintextRecord,
    recipient: &RsaPublicKey,
) -> Result<SealedArtifacts, SealError> {
    let key = generate_symmetric_key()?;
    let iv = generate_iv()?;

    let padded = Zeroizing::new(pkcs7_pad(&record.data));
    let ciphertext = Aes256CbcEnc::new_from_slices(key.as_ref(), &iv)
        .map_err(|e| SealError::Crypto(format!("AES-256-CBC init: {}", e)))?
        .encrypt_padded_vec_mut::<NoPadding>(&padded);

    let envelope = encode_envelope(&record.extension, &iv, &ciphertext)?;
    let wrapped_key = wrap_key(key.as_ref(), recipient)?;

    Ok(SealedArtifacts {
        envelope,
        wrapped_key,
    })
}

/// Decrypt an envelope and wrapped key back into the original record.
///
/// Structural envelope errors are reported before any RSA work. A wrong or
/// corrupted wrapped key fails with [`SealError::Unwrap`]; a ciphertext that
/// does not decrypt to valid padding fails with [`SealError::Padding`].
pub fn decrypt(
    envelope: &[u8],
    wrapped_key: &[u8],
    recipient: &RsaPrivateKey,
) -> Result<PlaintextRecord, SealError> {
    let parsed = decode_envelope(envelope)?;
    let key = unwrap_key(wrapped_key, recipient)?;

    let padded = Zeroizing::new(
        Aes256CbcDec::new_from_slices(key.as_ref(), &parsed.iv)
            .map_err(|e| SealError::Crypto(format!("AES-256-CBC init: {}", e)))?
            .decrypt_padded_vec_mut::<NoPadding>(&parsed.ciphertext)
            .map_err(|e| SealError::Crypto(format!("AES-256-CBC: {}", e)))?,
    );
    let data = pkcs7_unpad(&padded)?.to_vec();

    Ok(PlaintextRecord {
        extension: parsed.extension,
        data,
    })
}

/// [`encrypt`] with the recipient key given as PEM bytes.
pub fn encrypt_with_pem(
    record: &PlaintextRecord,
    public_key_pem: &[u8],
) -> Result<SealedArtifacts, SealError> {
    let recipient = parse_public_key_pem(public_key_pem)?;
    encrypt(record, &recipient)
}

/// [`decrypt`] with the private key given as PEM bytes.
pub fn decrypt_with_pem(
    envelope: &[u8],
    wrapped_key: &[u8],
    private_key_pem: &[u8],
) -> Result<PlaintextRecord, SealError> {
    let recipient = parse_private_key_pem(private_key_pem)?;
    decrypt(envelope, wrapped_key, &recipient)
}
