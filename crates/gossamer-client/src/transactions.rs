//! Request construction and the canonical ways of executing requests
//!
//! These are the building blocks every network operation is assembled
//! from: pick a transaction id, build and sign a body, pay for a query,
//! then hand the request to the executor with the right retry policy.

use tokio::time::Instant;

use gossamer_core::{Address, Epoch, ResponseCode, TxId};
use gossamer_crypto::Signatory;
use gossamer_network::{
    AccountAmount, Query, QueryHeader, Response, ResponseType, Transaction, TransactionBody,
    TransactionData, TransactionResponse, TransferList,
};

use crate::context::Context;
use crate::error::{ClientError, Result};
use crate::executor::{self, execute};
use crate::mapper::{self, Answer};

/// Effective signatory for one call
///
/// The context's signatory comes first, then the call-site extras; absent
/// entries are skipped and a lone signatory is used as-is.
pub fn gather_signatories(context: &Context, extras: &[Option<Signatory>]) -> Result<Signatory> {
    let signatories: Vec<Signatory> = context
        .signatory()
        .into_iter()
        .chain(extras.iter().flatten().cloned())
        .collect();
    if signatories.is_empty() {
        return Err(ClientError::Configuration { field: "signatory" });
    }
    Signatory::compose(signatories).map_err(ClientError::from)
}

/// Pinned transaction id, or a fresh one for the context's payer
pub fn get_or_create_transaction_id(context: &Context) -> Result<TxId> {
    if let Some(tx_id) = context.transaction() {
        return Ok(tx_id);
    }
    let payer = context.require_payer()?;
    let (seconds, nanos) = Epoch::unique_seconds_and_nanos(context.adjust_for_clock_drift());
    Ok(TxId::new(payer, seconds, nanos))
}

/// Net transfers per account, dropping accounts that net to zero
///
/// Accounts keep the order in which they first appear.
pub fn create_crypto_transfer_list(transfers: &[(Address, i64)]) -> TransferList {
    let mut net: Vec<(Address, i64)> = Vec::with_capacity(transfers.len());
    for &(address, amount) in transfers {
        match net.iter_mut().find(|(seen, _)| *seen == address) {
            Some((_, total)) => *total = total.saturating_add(amount),
            None => net.push((address, amount)),
        }
    }
    TransferList {
        account_amounts: net
            .into_iter()
            .filter(|(_, amount)| *amount != 0)
            .map(|(address, amount)| AccountAmount {
                account_id: mapper::to_account_id(address),
                amount,
            })
            .collect(),
    }
}

/// Transaction body carrying the context's gateway, fee, duration and memo
pub fn create_transaction_body(context: &Context, tx_id: &TxId) -> Result<TransactionBody> {
    let gateway = context.require_gateway()?;
    Ok(TransactionBody {
        transaction_id: mapper::to_transaction_id(tx_id),
        node_account_id: mapper::to_account_id(gateway.address),
        transaction_fee: context.fee_limit(),
        transaction_valid_duration: mapper::to_duration(context.transaction_duration()),
        memo: context.memo(),
        data: None,
    })
}

/// Header for asking what a query costs; the payment is an empty placeholder
pub fn create_ask_cost_header() -> QueryHeader {
    QueryHeader {
        payment: Some(Transaction::default()),
        response_type: ResponseType::CostAnswer,
    }
}

/// Header paying `query_fee` from the payer to the gateway node
///
/// Fails with `InsufficientTxFee` when the fee exceeds the context's limit.
pub async fn create_and_sign_query_header(
    context: &Context,
    query_fee: u64,
    tx_id: &TxId,
) -> Result<QueryHeader> {
    let gateway = context.require_gateway()?;
    let payer = context.require_payer()?;
    let signatory = context.require_signatory()?;
    if query_fee > context.fee_limit() {
        return Err(ClientError::Precheck {
            code: ResponseCode::InsufficientTxFee,
            transaction_id: Some(*tx_id),
        });
    }
    let fee = i64::try_from(query_fee).map_err(|_| ClientError::Precheck {
        code: ResponseCode::InsufficientTxFee,
        transaction_id: Some(*tx_id),
    })?;

    let mut body = create_transaction_body(context, tx_id)?;
    body.data = Some(TransactionData::CryptoTransfer {
        transfers: create_crypto_transfer_list(&[(payer, -fee), (gateway.address, fee)]),
    });
    Ok(QueryHeader {
        payment: Some(sign_transaction(&body, &signatory).await?),
        response_type: ResponseType::AnswerOnly,
    })
}

/// Encode and sign a body
///
/// Signing completes before anything is sent; a failing signatory aborts
/// the call with `ClientError::Signing`.
pub async fn sign_transaction(body: &TransactionBody, signatory: &Signatory) -> Result<Transaction> {
    let body_bytes = body.to_body_bytes()?;
    let tx_id = mapper::from_transaction_id(&body.transaction_id);
    let signatures = signatory
        .sign(tx_id, body_bytes.clone())
        .await
        .map_err(ClientError::signing)?;
    Ok(Transaction {
        body_bytes,
        sig_map: mapper::to_signature_map(&signatures),
    })
}

/// Retry while the gateway is busy
pub fn retry_on_busy<R: Answer>(response: &R) -> bool {
    response.precheck_code() == ResponseCode::Busy
}

/// Retry while the gateway is busy or rejects the valid-start time
pub fn retry_on_busy_or_invalid_start<R: Answer>(response: &R) -> bool {
    matches!(
        response.precheck_code(),
        ResponseCode::Busy | ResponseCode::InvalidTransactionStart
    )
}

/// Run a free cost-estimation query; anything but `Ok` is a precheck failure
pub async fn execute_unsigned_ask(context: &Context, query: Query) -> Result<Response> {
    let answer = execute(context, query, executor::run_query, retry_on_busy::<Response>).await?;
    match answer.precheck_code() {
        ResponseCode::Ok => Ok(answer),
        code => Err(ClientError::Precheck {
            code,
            transaction_id: None,
        }),
    }
}

/// Run a paid query
pub async fn execute_signed_query(context: &Context, query: Query) -> Result<Response> {
    let should_retry = drift_tracking_retry(context);
    execute(context, query, executor::run_query, should_retry).await
}

/// Submit a signed transaction
pub async fn execute_signed_transaction(
    context: &Context,
    transaction: Transaction,
) -> Result<TransactionResponse> {
    let should_retry = drift_tracking_retry(context);
    execute(context, transaction, executor::submit_transaction, should_retry).await
}

/// `retry_on_busy_or_invalid_start` that also corrects the clock drift
///
/// With drift adjustment on and no pinned transaction id, the time from
/// the start of the call to an `InvalidTransactionStart` answer is added
/// to the process-wide drift offset.
fn drift_tracking_retry<R: Answer>(context: &Context) -> impl FnMut(&R) -> bool {
    let track = context.adjust_for_clock_drift() && context.transaction().is_none();
    let started = Instant::now();
    move |response: &R| {
        if track && response.precheck_code() == ResponseCode::InvalidTransactionStart {
            let elapsed = i64::try_from(started.elapsed().as_nanos()).unwrap_or(i64::MAX);
            Epoch::add_to_clock_drift(elapsed);
        }
        retry_on_busy_or_invalid_start(response)
    }
}

/// Check a terminal transaction answer
pub fn validate_precheck(tx_id: &TxId, code: ResponseCode) -> Result<()> {
    if code == ResponseCode::Ok {
        return Ok(());
    }
    Err(ClientError::Precheck {
        code,
        transaction_id: Some(*tx_id),
    })
}
