//! # Wire Messages
//!
//! Request and response shapes exchanged with gateway nodes. These mirror
//! the network's RPC schema field for field; converting to and from the
//! SDK's domain values is the wire mapper's job, not this module's.

use serde::{Deserialize, Serialize};
use std::fmt;

use gossamer_core::ResponseCode;

use crate::error::{NetworkError, Result};

/// Any message that can cross the wire, as seen by observers
pub trait WireMessage: fmt::Debug + Send + Sync {
    /// Schema name of the message
    fn message_name(&self) -> &'static str;

    /// Encoded bytes, as sent on the wire
    fn to_bytes(&self) -> Vec<u8>;
}

macro_rules! wire_message {
    ($($ty:ident),* $(,)?) => {
        $(
            impl WireMessage for $ty {
                fn message_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn to_bytes(&self) -> Vec<u8> {
                    bincode::serialize(self).unwrap_or_else(|e| {
                        tracing::warn!(message = stringify!($ty), error = %e, "Failed to encode message for observers");
                        Vec::new()
                    })
                }
            }
        )*
    };
}

wire_message!(
    Transaction,
    TransactionBody,
    TransactionResponse,
    Query,
    Response,
    TransportNotice,
);

/// Account identifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    pub shard_num: u64,
    pub realm_num: u64,
    pub account_num: u64,
}

/// Point in time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

/// Length of time, whole seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireDuration {
    pub seconds: i64,
}

/// Transaction identifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub transaction_valid_start: Timestamp,
}

/// Public key or key structure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Ed25519(#[serde(with = "serde_bytes")] Vec<u8>),
    Rsa3072(#[serde(with = "serde_bytes")] Vec<u8>),
    Ecdsa384(#[serde(with = "serde_bytes")] Vec<u8>),
    ThresholdKey(ThresholdKey),
    KeyList(KeyList),
}

/// Ordered list of keys, all required unless wrapped in a threshold
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyList {
    pub keys: Vec<Key>,
}

/// n-of-m key list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdKey {
    pub threshold: u32,
    pub keys: KeyList,
}

/// Signature keyed by a prefix of the signer's public key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    #[serde(with = "serde_bytes")]
    pub pub_key_prefix: Vec<u8>,
    pub signature: Signature,
}

/// Signature bytes tagged with their algorithm
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    Ed25519(#[serde(with = "serde_bytes")] Vec<u8>),
    Rsa3072(#[serde(with = "serde_bytes")] Vec<u8>),
    Ecdsa384(#[serde(with = "serde_bytes")] Vec<u8>),
}

/// All signatures attached to a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMap {
    pub sig_pair: Vec<SignaturePair>,
}

/// One account's share of a transfer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAmount {
    pub account_id: AccountId,
    pub amount: i64,
}

/// Balanced set of account credits and debits
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferList {
    pub account_amounts: Vec<AccountAmount>,
}

/// Operation-specific part of a transaction body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    CryptoTransfer { transfers: TransferList },
}

/// Everything a transaction's signatures cover
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    pub transaction_id: TransactionId,
    pub node_account_id: AccountId,
    pub transaction_fee: u64,
    pub transaction_valid_duration: WireDuration,
    pub memo: String,
    pub data: Option<TransactionData>,
}

impl TransactionBody {
    /// Encode the body; these bytes are what signatories sign
    pub fn to_body_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| NetworkError::Encoding(e.to_string()))
    }

    /// Decode body bytes taken from a transaction
    pub fn from_body_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| NetworkError::Encoding(e.to_string()))
    }
}

/// Signed (or cost-query placeholder) transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "serde_bytes")]
    pub body_bytes: Vec<u8>,
    pub sig_map: SignatureMap,
}

impl Transaction {
    /// Transaction id carried by the encoded body, if it decodes
    pub fn transaction_id(&self) -> Option<TransactionId> {
        if self.body_bytes.is_empty() {
            return None;
        }
        TransactionBody::from_body_bytes(&self.body_bytes)
            .ok()
            .map(|body| body.transaction_id)
    }
}

/// Gateway's immediate verdict on a submitted transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub node_transaction_precheck_code: ResponseCode,
    pub cost: u64,
}

/// Whether a query wants its answer or only the answer's price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    #[default]
    AnswerOnly,
    CostAnswer,
}

/// Payment and answer mode shared by all queries
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHeader {
    pub payment: Option<Transaction>,
    pub response_type: ResponseType,
}

/// Query-specific part of a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryData {
    TransactionGetReceipt { transaction_id: TransactionId },
    CryptoGetAccountBalance { account_id: AccountId },
}

/// Read-only request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub header: QueryHeader,
    pub data: QueryData,
}

/// Precheck verdict and price shared by all query responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub node_transaction_precheck_code: ResponseCode,
    pub response_type: ResponseType,
    pub cost: u64,
}

/// Outcome of a transaction reached by consensus
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub status: ResponseCode,
}

/// Query-specific part of a response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseData {
    TransactionGetReceipt {
        receipt: Option<TransactionReceipt>,
    },
    CryptoGetAccountBalance {
        account_id: AccountId,
        balance: u64,
    },
}

/// Answer to a query
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub header: ResponseHeader,
    pub data: Option<ResponseData>,
}

/// Locally generated notice reported to observers in place of a response
/// when the transport failed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportNotice {
    pub message: String,
}
