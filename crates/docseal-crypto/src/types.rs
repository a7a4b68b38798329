/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// AES-CBC IV length in bytes (one cipher block).
pub const CBC_IV_LENGTH: usize = 16;

/// AES block size in bytes. Ciphertext is always a multiple of this.
pub const BLOCK_SIZE: usize = 16;

/// Size of the big-endian extension length prefix at the head of an envelope.
pub const EXTENSION_LENGTH_PREFIX: usize = 4;

/// Longest extension tag accepted by the envelope codec.
pub const MAX_EXTENSION_LENGTH: usize = 65535;

/// RSA modulus size used by the key provisioner.
pub const RSA_KEY_BITS: usize = 2048;

/// Smallest RSA modulus accepted as a wrapping key.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA public exponent used by the key provisioner.
pub const RSA_PUBLIC_EXPONENT: u64 = 65537;

/// Wrapped key length for a 2048-bit recipient key.
pub const WRAPPED_KEY_LENGTH: usize = RSA_KEY_BITS / 8;

/// Extension recorded when the caller has nothing better.
pub const DEFAULT_EXTENSION: &str = ".pdf";

/// A file's bytes plus the extension needed to restore its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextRecord {
    /// Extension tag including the leading dot, e.g. `.pdf`.
    pub extension: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl PlaintextRecord {
    pub fn new(extension: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            extension: extension.into(),
            data,
        }
    }
}

/// The two artifacts produced by one encryption. Only meaningful as a pair.
#[derive(Debug, Clone)]
pub struct SealedArtifacts {
    /// The `.enc` envelope bytes.
    pub envelope: Vec<u8>,
    /// The `.key` RSA-OAEP wrapped symmetric key.
    pub wrapped_key: Vec<u8>,
}
