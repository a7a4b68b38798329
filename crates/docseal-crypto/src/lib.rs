//! Hybrid file encryption: AES-256-CBC envelopes with RSA-OAEP wrapped keys.
//!
//! `.enc` wire format: [ext_len:4 BE][ext UTF-8][IV:16][AES-256-CBC(PKCS#7(data))]
//! `.key` wire format: RSA-OAEP(SHA-256, MGF1-SHA-256, empty label) of the 32-byte key

pub mod envelope;
pub mod error;
pub mod hybrid;
pub mod keys;
pub mod padding;
pub mod types;

pub use envelope::{decode_envelope, encode_envelope, CiphertextEnvelope};
pub use error::SealError;
pub use hybrid::{
    decrypt, decrypt_with_pem, encrypt, encrypt_with_pem, generate_iv, generate_symmetric_key,
    unwrap_key, wrap_key,
};
pub use keys::{
    is_valid_public_key_pem, parse_private_key_pem, parse_public_key_pem, public_key_to_pem,
    KeyPair,
};
pub use padding::{pkcs7_pad, pkcs7_unpad};
pub use rsa::traits::PublicKeyParts;
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use types::{
    PlaintextRecord, SealedArtifacts, AES_KEY_LENGTH, BLOCK_SIZE, CBC_IV_LENGTH,
    DEFAULT_EXTENSION, EXTENSION_LENGTH_PREFIX, MAX_EXTENSION_LENGTH, MIN_RSA_KEY_BITS,
    RSA_KEY_BITS, RSA_PUBLIC_EXPONENT, WRAPPED_KEY_LENGTH,
};
