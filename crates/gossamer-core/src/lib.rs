//! # Gossamer Core
//!
//! Core value types shared by every layer of the Gossamer client SDK.
//!
//! This crate provides the fundamental building blocks:
//! - `Address` - shard.realm.num identifier of accounts, files and gateway nodes
//! - `Gateway` - a network node reachable at a URL, paid through its account
//! - `TxId` - payer + valid-start timestamp identifying one transaction
//! - `ResponseCode` - business codes returned by the network
//! - `Epoch` - unique valid-start timestamps and the process-wide clock drift
//!
//! ## Layering
//!
//! ```text
//!   gossamer-client   (context, executor, wire mapper)
//!        │
//!        ├── gossamer-network  (messages, channels, gRPC transport)
//!        ├── gossamer-crypto   (endorsements, signatories)
//!        │
//!   gossamer-core     (this crate)
//! ```

pub mod epoch;
pub mod error;
pub mod types;

pub use epoch::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::epoch::Epoch;
    pub use crate::error::{CoreError, Result};
    pub use crate::types::*;
}
