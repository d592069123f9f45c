//! Error types for Gossamer core value parsing

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing or validating core values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Address text was not `shard.realm.num`
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transaction id text was not `shard.realm.num@seconds.nanos`
    #[error("Invalid transaction id: {0}")]
    InvalidTransactionId(String),

    /// Gateway URL was blank
    #[error("Invalid gateway: {0}")]
    InvalidGateway(String),
}
