//! # Resilient Executor
//!
//! Sends one request through a context's gateway channel and keeps at it
//! until the gateway gives an answer the caller accepts.
//!
//! ```text
//!            ┌─────────────────────────────────────────────┐
//!            ▼                                             │
//!   ┌──────────────┐  answer   ┌──────────┐  retry   ┌─────┴─────┐
//!   │     Send     ├──────────►│ Classify ├─────────►│ RetryWait │
//!   └──────┬───────┘           └────┬─────┘          └─────▲─────┘
//!          │ unavailable            │ accept               │
//!          ▼                        ▼                      │ not found
//!   ┌──────────────┐  found   ┌──────────┐                 │
//!   │ ReceiptProbe ├─────────►│  Accept  │                 │
//!   └──────┬───────┘          └──────────┘                 │
//!          └───────────────────────────────────────────────┘
//!
//!   attempts exhausted ──► FinalAttempt (answer returned as-is)
//! ```
//!
//! An unavailable gateway may still have accepted a transaction before the
//! connection dropped, so a mutating request is followed by a receipt
//! probe rather than a blind resend. The probe shares the attempt budget.
//!
//! Backoff is linear: the wait after attempt `n` is `retry_delay * (n + 1)`,
//! and the wait before probing after attempt `n` is `retry_delay * n`.
//!
//! Every wait and send runs under the context's cancellation token;
//! cancelling yields `ClientError::Cancelled` and nothing else.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tonic::Status;
use tracing::{debug, error, info, warn};

use gossamer_core::ResponseCode;
use gossamer_network::{
    is_unavailable, Channel, Query, Response, Transaction, TransactionResponse, TransportNotice,
    WireMessage,
};

use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::mapper;

/// A request the executor can send
pub trait Submission: WireMessage + Clone {
    /// Receipt query to run when the gateway drops the connection
    ///
    /// Only mutating requests have one.
    fn receipt_probe(&self) -> Option<Query> {
        None
    }
}

impl Submission for Transaction {
    fn receipt_probe(&self) -> Option<Query> {
        self.transaction_id()
            .map(|transaction_id| mapper::build_receipt_probe(&transaction_id))
    }
}

impl Submission for Query {}

/// A response the executor can return
pub trait Reply: WireMessage + Sized {
    /// Response standing in for a lost answer once a receipt was found
    fn from_receipt_probe(_status: ResponseCode) -> Option<Self> {
        None
    }
}

impl Reply for TransactionResponse {
    /// A receipt only exists for a transaction that passed precheck, so
    /// the stand-in reports `Ok` whatever the receipt's own status.
    fn from_receipt_probe(_status: ResponseCode) -> Option<Self> {
        Some(TransactionResponse {
            node_transaction_precheck_code: ResponseCode::Ok,
            cost: 0,
        })
    }
}

impl Reply for Response {}

/// Bound RPC for submitting transactions on a channel
pub fn submit_transaction(
    channel: &Channel,
) -> impl Fn(Transaction) -> BoxFuture<'static, std::result::Result<TransactionResponse, Status>> {
    let service = channel.service().clone();
    move |transaction| {
        let service = service.clone();
        Box::pin(async move { service.submit_transaction(transaction).await })
    }
}

/// Bound RPC for running queries on a channel
pub fn run_query(
    channel: &Channel,
) -> impl Fn(Query) -> BoxFuture<'static, std::result::Result<Response, Status>> {
    let service = channel.service().clone();
    move |query| {
        let service = service.clone();
        Box::pin(async move { service.query(query).await })
    }
}

enum State<Resp> {
    Send,
    ReceiptProbe(Query),
    RetryWait,
    Exhausted,
    Accept(Resp),
}

type SendingHook = Box<dyn Fn(&dyn WireMessage) + Send + Sync>;
type ReceivedHook = Box<dyn Fn(usize, &dyn WireMessage) + Send + Sync>;

fn sending_hook(context: &Context) -> SendingHook {
    let observers = context.sending_observers();
    if observers.is_empty() {
        return Box::new(|_| {});
    }
    Box::new(move |message| {
        for observer in &observers {
            observer(message);
        }
    })
}

fn received_hook(context: &Context) -> ReceivedHook {
    let observers = context.received_observers();
    if observers.is_empty() {
        return Box::new(|_, _| {});
    }
    Box::new(move |attempt, message| {
        for observer in &observers {
            observer(attempt, message);
        }
    })
}

fn transport_failure(channel: &Channel, status: &Status) -> ClientError {
    error!(url = channel.url(), code = ?status.code(), "Gateway request failed");
    ClientError::TransportFailure {
        code: status.code(),
        message: format!(
            "Unable to communicate with network node {}: {}",
            channel.url(),
            status.message()
        ),
    }
}

fn unavailable_notice(channel: &Channel, status: &Status) -> TransportNotice {
    TransportNotice {
        message: format!(
            "Unable to communicate with network node {}, it may be down or not reachable: {}",
            channel.url(),
            status.message()
        ),
    }
}

/// Send `request` through the context's gateway until an answer is accepted
///
/// `instantiate` is called once with the resolved channel and returns the
/// RPC used for every attempt. `should_retry` decides whether an answer is
/// transient. After `retry_count` attempts one final send is made and its
/// answer returned whatever it says.
pub async fn execute<Req, Resp, I, F, Fut, P>(
    context: &Context,
    request: Req,
    instantiate: I,
    should_retry: P,
) -> Result<Resp>
where
    Req: Submission,
    Resp: Reply,
    I: FnOnce(&Channel) -> F,
    F: Fn(Req) -> Fut,
    Fut: Future<Output = std::result::Result<Resp, Status>>,
    P: FnMut(&Resp) -> bool,
{
    let channel = context.channel()?;
    let send = instantiate(&channel);
    let token = context.cancellation_token().clone();

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!(url = channel.url(), "Request cancelled");
            Err(ClientError::Cancelled)
        }
        result = run(context, &channel, request, send, should_retry) => result,
    }
}

async fn run<Req, Resp, F, Fut, P>(
    context: &Context,
    channel: &Channel,
    request: Req,
    send: F,
    mut should_retry: P,
) -> Result<Resp>
where
    Req: Submission,
    Resp: Reply,
    F: Fn(Req) -> Fut,
    Fut: Future<Output = std::result::Result<Resp, Status>>,
    P: FnMut(&Resp) -> bool,
{
    let max_attempts = context.retry_count();
    let retry_delay = context.retry_delay();
    let on_sending = sending_hook(context);
    let on_received = received_hook(context);

    on_sending(&request);

    let mut attempt = 0usize;
    let mut state = State::Send;
    loop {
        state = match state {
            State::Send if attempt >= max_attempts => State::Exhausted,
            State::Send => {
                debug!(url = channel.url(), attempt, request = request.message_name(), "Sending request");
                match send(request.clone()).await {
                    Ok(response) => {
                        on_received(attempt, &response);
                        if should_retry(&response) {
                            State::RetryWait
                        } else {
                            State::Accept(response)
                        }
                    }
                    Err(status) if is_unavailable(&status) => {
                        warn!(url = channel.url(), attempt, "Gateway unavailable");
                        on_received(attempt, &unavailable_notice(channel, &status));
                        match request.receipt_probe() {
                            Some(probe) => {
                                tokio::time::sleep(backoff(retry_delay, attempt)).await;
                                State::ReceiptProbe(probe)
                            }
                            None => State::RetryWait,
                        }
                    }
                    Err(status) => return Err(transport_failure(channel, &status)),
                }
            }
            State::ReceiptProbe(probe) => {
                let answer =
                    probe_receipt(channel, &probe, &mut attempt, max_attempts, retry_delay, &on_received)
                        .await?;
                // Observers see the stand-in when a receipt was found
                let stand_in = answer
                    .as_ref()
                    .and_then(mapper::extract_receipt_status)
                    .and_then(Resp::from_receipt_probe);
                match (stand_in, answer) {
                    (Some(response), _) => {
                        on_received(attempt, &response);
                        if should_retry(&response) {
                            State::RetryWait
                        } else {
                            info!(url = channel.url(), attempt, "Accepted transaction via receipt probe");
                            State::Accept(response)
                        }
                    }
                    (None, Some(answer)) => {
                        on_received(attempt, &answer);
                        State::RetryWait
                    }
                    (None, None) => State::RetryWait,
                }
            }
            State::RetryWait => {
                tokio::time::sleep(backoff(retry_delay, attempt + 1)).await;
                attempt += 1;
                State::Send
            }
            State::Exhausted => {
                debug!(url = channel.url(), attempts = max_attempts, "Retries exhausted, final attempt");
                let response = send(request.clone())
                    .await
                    .map_err(|status| transport_failure(channel, &status))?;
                on_received(max_attempts, &response);
                return Ok(response);
            }
            State::Accept(response) => return Ok(response),
        };
    }
}

/// Ask the gateway for the receipt of the transaction it may have accepted
///
/// Repeated unavailability consumes the shared attempt budget. Returns the
/// gateway's answer, or `None` once the budget ran out.
async fn probe_receipt(
    channel: &Channel,
    probe: &Query,
    attempt: &mut usize,
    max_attempts: usize,
    retry_delay: Duration,
    on_received: &ReceivedHook,
) -> Result<Option<Response>> {
    while *attempt < max_attempts {
        match channel.service().query(probe.clone()).await {
            Ok(response) => return Ok(Some(response)),
            Err(status) if is_unavailable(&status) => {
                warn!(url = channel.url(), attempt = *attempt, "Gateway unavailable during receipt probe");
                on_received(*attempt, &unavailable_notice(channel, &status));
            }
            Err(status) => return Err(transport_failure(channel, &status)),
        }
        tokio::time::sleep(backoff(retry_delay, *attempt + 1)).await;
        *attempt += 1;
    }
    Ok(None)
}

fn backoff(retry_delay: Duration, factor: usize) -> Duration {
    retry_delay.saturating_mul(u32::try_from(factor).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear() {
        let delay = Duration::from_millis(200);
        assert_eq!(backoff(delay, 0), Duration::ZERO);
        assert_eq!(backoff(delay, 1), Duration::from_millis(200));
        assert_eq!(backoff(delay, 3), Duration::from_millis(600));
    }

    #[test]
    fn test_only_transactions_probe() {
        let query = mapper::build_receipt_probe(&Default::default());
        assert!(query.receipt_probe().is_none());
        assert!(Transaction::default().receipt_probe().is_none());
    }

    #[test]
    fn test_probe_stand_in_only_for_transactions() {
        let stand_in = TransactionResponse::from_receipt_probe(ResponseCode::Success).unwrap();
        assert_eq!(stand_in.node_transaction_precheck_code, ResponseCode::Ok);
        assert!(Response::from_receipt_probe(ResponseCode::Success).is_none());
    }
}
