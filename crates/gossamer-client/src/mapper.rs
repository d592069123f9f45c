//! # Wire Mapper
//!
//! Conversions between SDK values and wire messages, and the handful of
//! response accessors the executor's callers rely on.
//!
//! | SDK value | Wire message |
//! |-----------|--------------|
//! | `Address` | `AccountId` |
//! | `TxId` | `TransactionId` |
//! | `Duration` | `WireDuration` |
//! | `Endorsement` | `Key` |
//! | `SignatureSet` | `SignatureMap` |

use std::time::Duration;

use gossamer_core::{Address, ResponseCode, TxId};
use gossamer_crypto::{Endorsement, EndorsementKind, KeyType, SignaturePair as SdkSignaturePair, SignatureSet};
use gossamer_network::{
    AccountId, Key, KeyList, Query, QueryData, QueryHeader, Response, ResponseData, Signature,
    SignatureMap, SignaturePair, ThresholdKey, Timestamp, TransactionId, TransactionResponse,
    WireDuration, WireMessage,
};

use crate::error::Result;

/// A response carrying a precheck code and a cost
pub trait Answer: WireMessage {
    fn precheck_code(&self) -> ResponseCode;
    fn cost(&self) -> u64;
}

impl Answer for TransactionResponse {
    fn precheck_code(&self) -> ResponseCode {
        self.node_transaction_precheck_code
    }

    fn cost(&self) -> u64 {
        self.cost
    }
}

impl Answer for Response {
    fn precheck_code(&self) -> ResponseCode {
        self.header.node_transaction_precheck_code
    }

    fn cost(&self) -> u64 {
        self.header.cost
    }
}

/// Precheck code the gateway reported
pub fn extract_precheck_code<R: Answer>(response: &R) -> ResponseCode {
    response.precheck_code()
}

/// Price the gateway quoted for answering the query
pub fn extract_cost<R: Answer>(response: &R) -> u64 {
    response.cost()
}

pub fn to_account_id(address: Address) -> AccountId {
    AccountId {
        shard_num: address.shard,
        realm_num: address.realm,
        account_num: address.num,
    }
}

pub fn from_account_id(account_id: &AccountId) -> Address {
    Address::new(account_id.shard_num, account_id.realm_num, account_id.account_num)
}

/// Whole seconds; sub-second precision is dropped
pub fn to_duration(duration: Duration) -> WireDuration {
    WireDuration {
        seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
    }
}

pub fn to_transaction_id(tx_id: &TxId) -> TransactionId {
    TransactionId {
        account_id: to_account_id(tx_id.payer),
        transaction_valid_start: Timestamp {
            seconds: tx_id.valid_start_seconds,
            nanos: tx_id.valid_start_nanos,
        },
    }
}

pub fn from_transaction_id(transaction_id: &TransactionId) -> TxId {
    TxId::new(
        from_account_id(&transaction_id.account_id),
        transaction_id.transaction_valid_start.seconds,
        transaction_id.transaction_valid_start.nanos,
    )
}

/// Wire form of an endorsement
///
/// A threshold requiring every child becomes a plain key list.
pub fn to_key(endorsement: &Endorsement) -> Key {
    match endorsement.kind() {
        EndorsementKind::Key {
            key_type,
            public_key,
        } => match key_type {
            KeyType::Rsa3072 => Key::Rsa3072(public_key.clone()),
            KeyType::Ecdsa384 => Key::Ecdsa384(public_key.clone()),
            KeyType::Ed25519 | KeyType::List => Key::Ed25519(public_key.clone()),
        },
        EndorsementKind::Threshold {
            required_count,
            children,
        } => {
            let keys = KeyList {
                keys: children.iter().map(to_key).collect(),
            };
            if *required_count as usize == children.len() {
                Key::KeyList(keys)
            } else {
                Key::ThresholdKey(ThresholdKey {
                    threshold: *required_count,
                    keys,
                })
            }
        }
    }
}

/// Endorsement described by a wire key, validating every leaf
pub fn from_key(key: &Key) -> Result<Endorsement> {
    let endorsement = match key {
        Key::Ed25519(bytes) => Endorsement::single(KeyType::Ed25519, bytes)?,
        Key::Rsa3072(bytes) => Endorsement::single(KeyType::Rsa3072, bytes)?,
        Key::Ecdsa384(bytes) => Endorsement::single(KeyType::Ecdsa384, bytes)?,
        Key::KeyList(list) => Endorsement::all_of(from_key_list(list)?)?,
        Key::ThresholdKey(threshold) => {
            Endorsement::threshold(threshold.threshold, from_key_list(&threshold.keys)?)?
        }
    };
    Ok(endorsement)
}

fn from_key_list(list: &KeyList) -> Result<Vec<Endorsement>> {
    list.keys.iter().map(from_key).collect()
}

/// Wire signature map; each pair is keyed by the signer's full public key
pub fn to_signature_map(signatures: &SignatureSet) -> SignatureMap {
    SignatureMap {
        sig_pair: signatures
            .iter()
            .map(|pair| SignaturePair {
                pub_key_prefix: pair.public_key.clone(),
                signature: match pair.key_type {
                    KeyType::Rsa3072 => Signature::Rsa3072(pair.signature.clone()),
                    KeyType::Ecdsa384 => Signature::Ecdsa384(pair.signature.clone()),
                    KeyType::Ed25519 | KeyType::List => Signature::Ed25519(pair.signature.clone()),
                },
            })
            .collect(),
    }
}

pub fn from_signature_map(map: &SignatureMap) -> SignatureSet {
    map.sig_pair
        .iter()
        .map(|pair| {
            let (key_type, signature) = match &pair.signature {
                Signature::Ed25519(bytes) => (KeyType::Ed25519, bytes),
                Signature::Rsa3072(bytes) => (KeyType::Rsa3072, bytes),
                Signature::Ecdsa384(bytes) => (KeyType::Ecdsa384, bytes),
            };
            SdkSignaturePair::new(key_type, pair.pub_key_prefix.clone(), signature.clone())
        })
        .collect()
}

/// Receipt query for a transaction id; free to ask, so no payment
pub fn build_receipt_probe(transaction_id: &TransactionId) -> Query {
    Query {
        header: QueryHeader::default(),
        data: QueryData::TransactionGetReceipt {
            transaction_id: *transaction_id,
        },
    }
}

/// Status of the receipt in a probe response
///
/// `None` when the gateway has no receipt yet or could not answer.
pub fn extract_receipt_status(response: &Response) -> Option<ResponseCode> {
    if response.header.node_transaction_precheck_code != ResponseCode::Ok {
        return None;
    }
    match &response.data {
        Some(ResponseData::TransactionGetReceipt {
            receipt: Some(receipt),
        }) if receipt.status != ResponseCode::Unknown => Some(receipt.status),
        _ => None,
    }
}
