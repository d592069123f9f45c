//! Scripted gateway shared by the client integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::Status;

use gossamer_client::Context;
use gossamer_core::{Address, Gateway, ResponseCode};
use gossamer_crypto::{KeyPair, Signatory};
use gossamer_network::{
    AccountId, Connector, GatewayService, Query, Response, ResponseData, ResponseHeader,
    ResponseType, Transaction, TransactionReceipt, TransactionResponse,
};

pub type Scripted<T> = std::result::Result<T, Status>;

/// Gateway that answers from a script and records what it was sent
///
/// Once a script runs dry the gateway answers `Busy`.
#[derive(Default)]
pub struct ScriptedGateway {
    submit_script: Mutex<VecDeque<Scripted<TransactionResponse>>>,
    query_script: Mutex<VecDeque<Scripted<Response>>>,
    pub submitted: Mutex<Vec<Transaction>>,
    pub queried: Mutex<Vec<Query>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_submits<I>(&self, steps: I)
    where
        I: IntoIterator<Item = Scripted<TransactionResponse>>,
    {
        self.submit_script.lock().extend(steps);
    }

    pub fn script_queries<I>(&self, steps: I)
    where
        I: IntoIterator<Item = Scripted<Response>>,
    {
        self.query_script.lock().extend(steps);
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().len()
    }

    pub fn query_count(&self) -> usize {
        self.queried.lock().len()
    }
}

#[async_trait]
impl GatewayService for ScriptedGateway {
    async fn submit_transaction(&self, transaction: Transaction) -> Scripted<TransactionResponse> {
        self.submitted.lock().push(transaction);
        let step = self.submit_script.lock().pop_front();
        step.unwrap_or_else(|| precheck(ResponseCode::Busy))
    }

    async fn query(&self, query: Query) -> Scripted<Response> {
        self.queried.lock().push(query);
        let step = self.query_script.lock().pop_front();
        step.unwrap_or_else(|| Ok(header_only(ResponseCode::Busy, 0)))
    }
}

/// Connector handing out one shared gateway and counting connections
pub struct SharedConnector {
    pub gateway: Arc<ScriptedGateway>,
    pub connects: AtomicUsize,
}

impl SharedConnector {
    pub fn new(gateway: Arc<ScriptedGateway>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for SharedConnector {
    fn connect(&self, _url: &str) -> gossamer_network::Result<Arc<dyn GatewayService>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.gateway.clone())
    }
}

pub const GATEWAY_URL: &str = "127.0.0.1:50211";

pub fn gateway() -> Gateway {
    Gateway::new(GATEWAY_URL, Address::account(3)).unwrap()
}

/// Root context wired to a scripted gateway, with a 100ms backoff unit
pub fn scripted_context(gateway_service: Arc<ScriptedGateway>) -> (Context, Arc<SharedConnector>) {
    let connector = SharedConnector::new(gateway_service);
    let context = Context::new(connector.clone());
    context.set_gateway(gateway());
    context.set_payer(Address::account(2));
    context.set_signatory(Signatory::ed25519(KeyPair::generate()));
    context.set_retry_delay(Duration::from_millis(100));
    (context, connector)
}

pub fn precheck(code: ResponseCode) -> Scripted<TransactionResponse> {
    Ok(TransactionResponse {
        node_transaction_precheck_code: code,
        cost: 0,
    })
}

pub fn unavailable<T>() -> Scripted<T> {
    Err(Status::unavailable("connection reset by peer"))
}

pub fn header_only(code: ResponseCode, cost: u64) -> Response {
    Response {
        header: ResponseHeader {
            node_transaction_precheck_code: code,
            response_type: ResponseType::AnswerOnly,
            cost,
        },
        data: None,
    }
}

pub fn receipt(status: ResponseCode) -> Scripted<Response> {
    Ok(Response {
        header: ResponseHeader {
            node_transaction_precheck_code: ResponseCode::Ok,
            ..Default::default()
        },
        data: Some(ResponseData::TransactionGetReceipt {
            receipt: Some(TransactionReceipt { status }),
        }),
    })
}

pub fn receipt_not_found() -> Scripted<Response> {
    Ok(header_only(ResponseCode::ReceiptNotFound, 0))
}

pub fn balance(account: u64, balance: u64, cost: u64) -> Scripted<Response> {
    Ok(Response {
        header: ResponseHeader {
            node_transaction_precheck_code: ResponseCode::Ok,
            response_type: ResponseType::AnswerOnly,
            cost,
        },
        data: Some(ResponseData::CryptoGetAccountBalance {
            account_id: AccountId {
                shard_num: 0,
                realm_num: 0,
                account_num: account,
            },
            balance,
        }),
    })
}
