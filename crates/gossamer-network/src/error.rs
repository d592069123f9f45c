//! Network error types

use thiserror::Error;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised while building channels or encoding messages
///
/// Failures of an RPC in flight are reported as `tonic::Status`, not as
/// this type, so callers can tell transport unavailability apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Gateway URL cannot be turned into an endpoint
    #[error("Invalid gateway URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Message could not be encoded or decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Channel could not be constructed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}
