//! # Gossamer Client
//!
//! Client SDK for a hashgraph-style ledger: builds, signs, submits and
//! reconciles transactions and queries against gateway nodes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      GOSSAMER CLIENT                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Client ──► child Context ──► transactions ──► executor      │
//! │                 │                  │              │          │
//! │         payer, gateway,      tx id, body,    send, retry,    │
//! │         signatory, retry     signatures      receipt probe   │
//! │                 │                  │              │          │
//! │           channel cache        Signatory      GatewayService │
//! │           (root, per URL)    (crypto crate)  (network crate) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gossamer_client::prelude::*;
//!
//! # async fn run() -> gossamer_client::Result<()> {
//! let client = Client::new(|ctx| {
//!     ctx.set_gateway(Gateway::new("127.0.0.1:50211", Address::account(3)).unwrap());
//!     ctx.set_payer(Address::account(1001));
//!     ctx.set_signatory(Signatory::ed25519(KeyPair::generate()));
//! });
//! let balance = client.get_account_balance(Address::account(1001)).await?;
//! println!("balance: {} tinybars", balance);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod mapper;
pub mod transactions;

pub use crate::client::{Client, Receipt};
pub use crate::config::ClientConfig;
pub use crate::context::{Context, Field, Value};
pub use crate::error::{ClientError, Result};
pub use crate::executor::{execute, Reply, Submission};
pub use crate::logging::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client prelude
pub mod prelude {
    pub use crate::client::{Client, Receipt};
    pub use crate::config::ClientConfig;
    pub use crate::context::{Context, Field, Value};
    pub use crate::error::{ClientError, Result};
    pub use gossamer_core::{Address, Gateway, ResponseCode, TxId};
    pub use gossamer_crypto::{Endorsement, KeyPair, KeyType, Signatory};
}
