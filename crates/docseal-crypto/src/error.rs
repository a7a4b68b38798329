use thiserror::Error;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("Invalid key material: {0}")]
    KeyFormat(String),

    #[error("Cipher failure: {0}")]
    Crypto(String),

    #[error("Key unwrap failed: {0}")]
    Unwrap(String),

    #[error("Invalid padding: {0}")]
    Padding(String),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}
