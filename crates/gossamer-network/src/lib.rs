//! # Gossamer Network Layer
//!
//! Everything between a signed request and the gateway node that answers it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   GOSSAMER NETWORK LAYER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │  │    Wire      │   │   Channel    │   │   Gateway    │     │
//! │  │  Messages    │──►│    Cache     │──►│   Service    │     │
//! │  │  (serde)     │   │  (per URL)   │   │   (trait)    │     │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘     │
//! │                                               │              │
//! │                                        ┌──────┴───────┐      │
//! │                                        │  gRPC/HTTP2  │      │
//! │                                        │  + bincode   │      │
//! │                                        └──────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure reporting
//!
//! | Failure | Type | Executor treatment |
//! |---------|------|--------------------|
//! | Bad gateway URL | `NetworkError::InvalidUrl` | configuration error |
//! | Node unreachable | `Status` with `Code::Unavailable` | back off, probe receipt |
//! | Any other RPC failure | `Status` | fatal |

pub mod channel;
pub mod codec;
pub mod error;
pub mod grpc;
pub mod message;
pub mod service;
pub mod transport;

pub use channel::{Channel, ChannelCache, Connector};
pub use codec::BincodeCodec;
pub use error::{NetworkError, Result};
pub use grpc::{GrpcConnector, GrpcGatewayService};
pub use message::*;
pub use service::{is_unavailable, GatewayService};
pub use transport::TransportConfig;

/// Network prelude
pub mod prelude {
    pub use crate::channel::{Channel, ChannelCache, Connector};
    pub use crate::error::{NetworkError, Result};
    pub use crate::grpc::GrpcConnector;
    pub use crate::message::{Query, Response, Transaction, TransactionResponse, WireMessage};
    pub use crate::service::GatewayService;
    pub use crate::transport::TransportConfig;
}
