//! Cryptographic error types

use thiserror::Error;

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors in cryptographic operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Public key bytes do not decode under the stated algorithm
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Private key bytes do not decode
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A numeric argument or list length is outside its allowed range
    #[error("{parameter} out of range: {message}")]
    OutOfRange {
        parameter: &'static str,
        message: String,
    },

    /// A signatory failed to produce its signatures
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Signature bytes are malformed
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl CryptoError {
    /// Shorthand for an `OutOfRange` error
    pub fn out_of_range(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            parameter,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = CryptoError::out_of_range("required_count", "must be at least one");
        assert_eq!(err.to_string(), "required_count out of range: must be at least one");
    }
}
