//! Error types for the Gossamer client

use gossamer_core::{CoreError, ResponseCode, TxId};
use gossamer_crypto::CryptoError;
use gossamer_network::NetworkError;
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
///
/// Retryable business codes never surface here; the executor either turns
/// them into an accepted response or returns the final attempt's answer.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A required context field is not set anywhere in the chain
    #[error("Configuration error: {field} is required but was not set in the context")]
    Configuration { field: &'static str },

    /// A context field name is not part of the configuration surface
    #[error("Unknown context field: {0}")]
    UnknownField(String),

    /// A value of the wrong kind was written to a context field
    #[error("Invalid value for context field {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        expected: &'static str,
    },

    /// A call argument is outside its allowed range
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument {
        name: &'static str,
        message: String,
    },

    /// Key, endorsement or signature validation failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A signatory failed; nothing was sent
    #[error("Signing error: {0}")]
    Signing(#[source] CryptoError),

    /// The network rejected the request
    #[error("Transaction failed pre-check: {code}")]
    Precheck {
        code: ResponseCode,
        transaction_id: Option<TxId>,
    },

    /// An RPC failed in a way that cannot be retried
    #[error("Transport failure ({code:?}): {message}")]
    TransportFailure { code: tonic::Code, message: String },

    /// The call was cancelled before it produced an answer
    #[error("Operation cancelled")]
    Cancelled,

    /// A response was missing a part the caller needed
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid value: {0}")]
    Core(#[from] CoreError),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClientError {
    /// Wrap a signatory failure
    pub fn signing(err: CryptoError) -> Self {
        Self::Signing(err)
    }

    /// Whether retrying the same call later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportFailure { code, .. } => matches!(
                code,
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded | tonic::Code::ResourceExhausted
            ),
            Self::Precheck { code, .. } => matches!(
                code,
                ResponseCode::Busy | ResponseCode::InvalidTransactionStart
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_field() {
        let err = ClientError::Configuration { field: "payer" };
        assert!(err.to_string().contains("payer"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        let busy = ClientError::Precheck {
            code: ResponseCode::Busy,
            transaction_id: None,
        };
        assert!(busy.is_retryable());

        let fatal = ClientError::TransportFailure {
            code: tonic::Code::Internal,
            message: "boom".to_string(),
        };
        assert!(!fatal.is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
    }

    #[test]
    fn test_signing_error_keeps_source() {
        use std::error::Error as _;

        let err = ClientError::signing(CryptoError::SigningFailed("device unplugged".to_string()));
        let source = err.source().expect("signing error has a source");
        assert!(source.to_string().contains("device unplugged"));
        assert!(!err.is_retryable());
    }
}
