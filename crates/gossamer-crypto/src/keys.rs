//! Key management for Gossamer
//!
//! Ed25519 is the native signing algorithm. Public keys are accepted either
//! as the raw 32-byte point or wrapped in the 44-byte DER/PKIX encoding the
//! network tooling exports; private keys as the raw 32-byte seed or the
//! 48-byte PKCS#8 encoding. Internally keys are always held raw.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

/// DER/PKIX header preceding a raw Ed25519 public key
pub const ED25519_PUBLIC_KEY_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// PKCS#8 header preceding a raw Ed25519 private key seed
pub const ED25519_PRIVATE_KEY_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Ed25519 signature size
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Algorithm of a single endorsement key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Ed25519 public key
    #[default]
    Ed25519,

    /// RSA-3072 public key
    Rsa3072,

    /// ECDSA P-384 public key
    Ecdsa384,

    /// n-of-m list of endorsements
    List,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ed25519 => "Ed25519",
            Self::Rsa3072 => "RSA-3072",
            Self::Ecdsa384 => "ECDSA-384",
            Self::List => "List",
        };
        f.write_str(name)
    }
}

/// Decode an Ed25519 public key from raw or DER-encoded bytes
pub fn parse_ed25519_public_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let raw = match bytes.len() {
        PUBLIC_KEY_LENGTH => bytes,
        44 if bytes[..12] == ED25519_PUBLIC_KEY_DER_PREFIX => &bytes[12..],
        _ => {
            return Err(CryptoError::InvalidKeyFormat(
                "The public key was not provided in a recognizable Ed25519 format.".to_string(),
            ))
        }
    };
    let raw: [u8; PUBLIC_KEY_LENGTH] = raw.try_into().map_err(|_| {
        CryptoError::InvalidKeyFormat("Ed25519 public key must be 32 bytes".to_string())
    })?;
    VerifyingKey::from_bytes(&raw).map_err(|_| {
        CryptoError::InvalidKeyFormat(
            "The public key was not provided in a recognizable Ed25519 format.".to_string(),
        )
    })
}

/// Decode an Ed25519 private key from a raw seed or PKCS#8 bytes
pub fn parse_ed25519_private_key(bytes: &[u8]) -> Result<SigningKey> {
    let raw = match bytes.len() {
        SECRET_KEY_LENGTH => bytes,
        48 if bytes[..16] == ED25519_PRIVATE_KEY_DER_PREFIX => &bytes[16..],
        _ => {
            return Err(CryptoError::InvalidPrivateKey(
                "The private key was not provided in a recognizable Ed25519 format.".to_string(),
            ))
        }
    };
    let seed: Zeroizing<[u8; SECRET_KEY_LENGTH]> = Zeroizing::new(raw.try_into().map_err(|_| {
        CryptoError::InvalidPrivateKey("Ed25519 private key must be 32 bytes".to_string())
    })?);
    Ok(SigningKey::from_bytes(&seed))
}

/// Ed25519 signing keypair
///
/// The signing key zeroizes itself on drop.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Import a private key (raw seed or PKCS#8)
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            signing_key: parse_ed25519_private_key(bytes)?,
        })
    }

    /// Raw 32-byte public key
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Public key wrapped in its DER/PKIX encoding
    pub fn public_key_der(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(44);
        bytes.extend_from_slice(&ED25519_PUBLIC_KEY_DER_PREFIX);
        bytes.extend_from_slice(&self.public_key());
        bytes
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> [u8; ED25519_SIGNATURE_SIZE] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", &hex::encode(self.public_key())[..16])
    }
}

/// Verify an Ed25519 signature over `message`
pub fn verify_ed25519(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
    let key = parse_ed25519_public_key(public_key)?;
    let signature = ed25519_dalek::Signature::from_slice(signature)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(key.verify_strict(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keypair = KeyPair::generate();
        assert_ne!(keypair.public_key(), [0u8; 32]);
        assert_eq!(keypair.public_key_der().len(), 44);
    }

    #[test]
    fn test_keypair_signing() {
        let keypair = KeyPair::generate();
        let message = b"Test message";

        let signature = keypair.sign(message);
        assert!(verify_ed25519(&keypair.public_key(), message, &signature).unwrap());
        assert!(!verify_ed25519(&keypair.public_key(), b"Other message", &signature).unwrap());
    }

    #[test]
    fn test_private_key_import_formats() {
        let seed = [7u8; 32];
        let raw = KeyPair::from_private_key(&seed).unwrap();

        let mut pkcs8 = ED25519_PRIVATE_KEY_DER_PREFIX.to_vec();
        pkcs8.extend_from_slice(&seed);
        let der = KeyPair::from_private_key(&pkcs8).unwrap();

        assert_eq!(raw.public_key(), der.public_key());
        assert!(KeyPair::from_private_key(&seed[..31]).is_err());
    }

    #[test]
    fn test_public_key_formats() {
        let keypair = KeyPair::generate();
        let raw = parse_ed25519_public_key(&keypair.public_key()).unwrap();
        let der = parse_ed25519_public_key(&keypair.public_key_der()).unwrap();
        assert_eq!(raw, der);

        let mut bad_prefix = keypair.public_key_der();
        bad_prefix[0] = 0;
        assert!(matches!(
            parse_ed25519_public_key(&bad_prefix),
            Err(CryptoError::InvalidKeyFormat(_))
        ));
        assert!(parse_ed25519_public_key(&keypair.public_key()[..31]).is_err());
    }
}
