//! RSA key provisioning and PEM interchange.
//!
//! Private keys are exported as unencrypted PKCS#8 PEM, public keys as
//! SubjectPublicKeyInfo PEM. Import also accepts PKCS#1 PEM.

use rsa::rand_core::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::SealError;
use crate::types::{MIN_RSA_KEY_BITS, RSA_KEY_BITS, RSA_PUBLIC_EXPONENT};

/// Recipient key pair. The private half never enters the encrypt path.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generate a 2048-bit pair with public exponent 65537.
    pub fn generate() -> Result<Self, SealError> {
        Self::generate_with_bits(RSA_KEY_BITS)
    }

    /// Generate a pair with the given modulus size (at least 2048 bits).
    pub fn generate_with_bits(bits: usize) -> Result<Self, SealError> {
        if bits < MIN_RSA_KEY_BITS {
            return Err(SealError::KeyFormat(format!(
                "modulus of {} bits is below the {} bit minimum",
                bits, MIN_RSA_KEY_BITS
            )));
        }
        let exponent = BigUint::from(RSA_PUBLIC_EXPONENT);
        let private = RsaPrivateKey::new_with_exp(&mut OsRng, bits, &exponent)
            .map_err(|e| SealError::RngFailed(format!("RSA key generation: {}", e)))?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.n().bits()
    }

    /// Unencrypted PKCS#8 PEM of the private key.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>, SealError> {
        self.private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SealError::KeyFormat(format!("PKCS#8 encode: {}", e)))
    }

    /// SubjectPublicKeyInfo PEM of the public key.
    pub fn public_key_pem(&self) -> Result<String, SealError> {
        public_key_to_pem(&self.public)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Encode a public key as SubjectPublicKeyInfo PEM.
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String, SealError> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| SealError::KeyFormat(format!("SPKI encode: {}", e)))
}

/// Parse a public wrapping key from PEM bytes (SPKI or PKCS#1).
pub fn parse_public_key_pem(pem: &[u8]) -> Result<RsaPublicKey, SealError> {
    let text = pem_text(pem)?;
    let key = RsaPublicKey::from_public_key_pem(text)
        .or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_pem(text).map_err(|_| {
                SealError::KeyFormat(format!("not an RSA public key PEM: {}", spki_err))
            })
        })?;
    check_modulus(key.n().bits())?;
    Ok(key)
}

/// Parse a private key from PEM bytes (PKCS#8 or PKCS#1).
pub fn parse_private_key_pem(pem: &[u8]) -> Result<RsaPrivateKey, SealError> {
    let text = pem_text(pem)?;
    let key = RsaPrivateKey::from_pkcs8_pem(text)
        .or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(text).map_err(|_| {
                SealError::KeyFormat(format!("not an RSA private key PEM: {}", pkcs8_err))
            })
        })?;
    check_modulus(key.n().bits())?;
    Ok(key)
}

/// True if the bytes parse as an acceptable public wrapping key.
pub fn is_valid_public_key_pem(pem: &[u8]) -> bool {
    parse_public_key_pem(pem).is_ok()
}

fn pem_text(pem: &[u8]) -> Result<&str, SealError> {
    let text = std::str::from_utf8(pem)
        .map_err(|e| SealError::KeyFormat(format!("PEM is not UTF-8: {}", e)))?;
    Ok(text.trim())
}

fn check_modulus(bits: usize) -> Result<(), SealError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(SealError::KeyFormat(format!(
            "RSA modulus of {} bits is below the {} bit minimum",
            bits, MIN_RSA_KEY_BITS
        )));
    }
    Ok(())
}
