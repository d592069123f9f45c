//! # Gateway Service
//!
//! The narrow seam between the client core and the wire. Everything the
//! executor and its callers need from a gateway node is one of these two
//! calls; a production channel speaks gRPC, tests substitute scripted fakes.
//!
//! Failures are `tonic::Status`. `Code::Unavailable` means the node could not
//! be reached or dropped the connection, and is the only code the executor
//! treats as possibly-delivered.

use async_trait::async_trait;
use tonic::{Code, Status};

use crate::message::{Query, Response, Transaction, TransactionResponse};

/// RPC surface of a gateway node
#[async_trait]
pub trait GatewayService: Send + Sync {
    /// Submit a signed transaction for precheck and consensus
    async fn submit_transaction(&self, transaction: Transaction) -> Result<TransactionResponse, Status>;

    /// Run a query (receipts, balances, cost estimates)
    async fn query(&self, query: Query) -> Result<Response, Status>;
}

/// Whether a transport failure means the node was unreachable
pub fn is_unavailable(status: &Status) -> bool {
    status.code() == Code::Unavailable
}
