//! Client facade
//!
//! A `Client` owns the root context of one lineage. Every call runs in its
//! own child context, so per-call overrides never leak into the client.
//!
//! The operations here are deliberately few; each one exercises one of the
//! three request pipelines end to end:
//!
//! | Operation | Pipeline |
//! |-----------|----------|
//! | `get_receipt` | free query, retried until the receipt exists |
//! | `get_account_balance` | cost ask, then signed payment if not free |
//! | `transfer` | signed transaction, precheck, receipt |

use std::sync::Arc;

use gossamer_core::{Address, ResponseCode, TxId};
use gossamer_crypto::Signatory;
use gossamer_network::{Connector, GrpcConnector, Query, QueryData, Response, ResponseData, TransactionData};

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::executor::{self, execute};
use crate::mapper::{self, Answer};
use crate::transactions;

/// Outcome of a transaction once the network reached consensus on it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: TxId,
    pub status: ResponseCode,
}

/// Entry point for talking to the network
#[derive(Clone, Debug)]
pub struct Client {
    context: Context,
}

impl Client {
    /// Client speaking gRPC with default transport settings
    pub fn new<F>(configure: F) -> Self
    where
        F: FnOnce(&Context),
    {
        Self::with_connector(Arc::new(GrpcConnector::default()), configure)
    }

    /// Client opening channels through a custom connector
    pub fn with_connector<F>(connector: Arc<dyn Connector>, configure: F) -> Self
    where
        F: FnOnce(&Context),
    {
        let context = Context::new(connector);
        configure(&context);
        Self { context }
    }

    /// Client configured from a loaded `ClientConfig`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let context = Context::new(Arc::new(GrpcConnector::new(config.network.transport.clone())));
        config.apply(&context)?;
        Ok(Self { context })
    }

    /// Root context of this client
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Change the client's own settings
    pub fn configure<F>(&self, configure: F)
    where
        F: FnOnce(&Context),
    {
        configure(&self.context);
    }

    /// Client whose calls run under extra overrides
    ///
    /// Shares channels and cancellation with this client.
    pub fn clone_with<F>(&self, configure: F) -> Client
    where
        F: FnOnce(&Context),
    {
        Client {
            context: self.context.child_with(configure),
        }
    }

    /// Cancel every call in flight on this client and its clones
    pub fn cancel(&self) {
        self.context.cancel();
    }

    /// Receipt of a transaction, waiting until the network has one
    pub async fn get_receipt(&self, transaction_id: &TxId) -> Result<Receipt> {
        let context = self.context.child();
        receipt_in(&context, transaction_id).await
    }

    /// Balance of an account, in tinybars
    pub async fn get_account_balance(&self, address: Address) -> Result<u64> {
        let context = self.context.child();
        context.require_gateway()?;

        let mut query = Query {
            header: transactions::create_ask_cost_header(),
            data: QueryData::CryptoGetAccountBalance {
                account_id: mapper::to_account_id(address),
            },
        };
        let mut response = transactions::execute_unsigned_ask(&context, query.clone()).await?;
        let cost = mapper::extract_cost(&response);
        if cost > 0 {
            let tx_id = transactions::get_or_create_transaction_id(&context)?;
            query.header = transactions::create_and_sign_query_header(&context, cost, &tx_id).await?;
            response = transactions::execute_signed_query(&context, query).await?;
            transactions::validate_precheck(&tx_id, mapper::extract_precheck_code(&response))?;
        }
        match response.data {
            Some(ResponseData::CryptoGetAccountBalance { balance, .. }) => Ok(balance),
            _ => Err(ClientError::UnexpectedResponse(
                "balance query answered without a balance".to_string(),
            )),
        }
    }

    /// Move `amount` tinybars from one account to another
    ///
    /// `from_signatory` signs alongside the context's signatory when the
    /// sending account is not the payer.
    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: i64,
        from_signatory: Option<Signatory>,
    ) -> Result<Receipt> {
        if amount <= 0 {
            return Err(ClientError::InvalidArgument {
                name: "amount",
                message: "The amount to transfer must be greater than zero.".to_string(),
            });
        }
        let context = self.context.child();
        context.require_gateway()?;
        let tx_id = transactions::get_or_create_transaction_id(&context)?;

        let mut body = transactions::create_transaction_body(&context, &tx_id)?;
        body.data = Some(TransactionData::CryptoTransfer {
            transfers: transactions::create_crypto_transfer_list(&[(from, -amount), (to, amount)]),
        });
        let signatory = transactions::gather_signatories(&context, &[from_signatory])?;
        let transaction = transactions::sign_transaction(&body, &signatory).await?;

        let response = transactions::execute_signed_transaction(&context, transaction).await?;
        transactions::validate_precheck(&tx_id, response.precheck_code())?;
        receipt_in(&context, &tx_id).await
    }
}

async fn receipt_in(context: &Context, transaction_id: &TxId) -> Result<Receipt> {
    let probe = mapper::build_receipt_probe(&mapper::to_transaction_id(transaction_id));
    let response = execute(context, probe, executor::run_query, receipt_pending).await?;
    match response.precheck_code() {
        ResponseCode::Ok => {}
        code => {
            return Err(ClientError::Precheck {
                code,
                transaction_id: Some(*transaction_id),
            })
        }
    }
    let status = mapper::extract_receipt_status(&response).ok_or_else(|| {
        ClientError::UnexpectedResponse(format!("no receipt yet for {}", transaction_id))
    })?;
    Ok(Receipt {
        transaction_id: *transaction_id,
        status,
    })
}

fn receipt_pending(response: &Response) -> bool {
    match response.precheck_code() {
        ResponseCode::Busy | ResponseCode::ReceiptNotFound => true,
        ResponseCode::Ok => mapper::extract_receipt_status(response).is_none(),
        _ => false,
    }
}
