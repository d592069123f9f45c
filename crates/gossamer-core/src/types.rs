//! Core type definitions for Gossamer
//!
//! Identifiers follow the ledger's `shard.realm.num` convention. Every value
//! here is plain data with value semantics; none of them own network or
//! key material.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Address - identifies an account, file or gateway node on the ledger
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address {
    /// Shard number
    pub shard: u64,

    /// Realm number within the shard
    pub realm: u64,

    /// Entity number within the realm
    pub num: u64,
}

impl Address {
    /// Create a new address
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Address with shard and realm zero
    pub const fn account(num: u64) -> Self {
        Self::new(0, 0, num)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}.{}.{})", self.shard, self.realm, self.num)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(CoreError::InvalidAddress(s.to_string()));
        }
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| CoreError::InvalidAddress(s.to_string()))
        };
        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

/// Gateway - a network node the client submits requests to
///
/// The URL is where the gRPC channel connects; the address is the node's
/// account, which receives the node portion of transaction and query fees.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gateway {
    /// Endpoint, `host:port` or a full `http(s)://` URL
    pub url: String,

    /// Node account
    pub address: Address,
}

impl Gateway {
    /// Create a new gateway, rejecting a blank URL
    pub fn new(url: impl Into<String>, address: Address) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(CoreError::InvalidGateway("URL is required".to_string()));
        }
        Ok(Self { url, address })
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.url)
    }
}

/// TxId - identifies a transaction by its payer and valid-start time
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId {
    /// Account paying for the transaction
    pub payer: Address,

    /// Valid-start seconds since the Unix epoch
    pub valid_start_seconds: i64,

    /// Valid-start nanoseconds within the second
    pub valid_start_nanos: i32,
}

impl TxId {
    /// Create a transaction id
    pub const fn new(payer: Address, valid_start_seconds: i64, valid_start_nanos: i32) -> Self {
        Self {
            payer,
            valid_start_seconds,
            valid_start_nanos,
        }
    }

    /// Valid start as total nanoseconds since the Unix epoch
    pub fn valid_start_nanos_total(&self) -> i128 {
        self.valid_start_seconds as i128 * 1_000_000_000 + self.valid_start_nanos as i128
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}.{:09}",
            self.payer, self.valid_start_seconds, self.valid_start_nanos
        )
    }
}

impl FromStr for TxId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidTransactionId(s.to_string());
        let (payer, start) = s.trim().split_once('@').ok_or_else(invalid)?;
        let payer = payer.parse::<Address>().map_err(|_| invalid())?;
        let (seconds, nanos) = start.split_once('.').ok_or_else(invalid)?;
        let seconds = seconds.parse::<i64>().map_err(|_| invalid())?;
        let nanos = nanos.parse::<i32>().map_err(|_| invalid())?;
        if !(0..1_000_000_000).contains(&nanos) {
            return Err(invalid());
        }
        Ok(Self::new(payer, seconds, nanos))
    }
}

/// ResponseCode - business status codes reported by gateway nodes
///
/// Numeric values match the network's wire enumeration; codes this client
/// does not know collapse to `Unknown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResponseCode {
    Ok = 0,
    InvalidTransaction = 1,
    PayerAccountNotFound = 2,
    InvalidNodeAccount = 3,
    TransactionExpired = 4,
    InvalidTransactionStart = 5,
    InvalidTransactionDuration = 6,
    InvalidSignature = 7,
    MemoTooLong = 8,
    InsufficientTxFee = 9,
    InsufficientPayerBalance = 10,
    DuplicateTransaction = 11,
    Busy = 12,
    NotSupported = 13,
    InvalidFileId = 14,
    InvalidAccountId = 15,
    InvalidContractId = 16,
    InvalidTransactionId = 17,
    ReceiptNotFound = 18,
    RecordNotFound = 19,
    #[default]
    Unknown = 21,
    Success = 22,
    FailInvalid = 23,
    FailFee = 24,
    FailBalance = 25,
}

impl ResponseCode {
    /// Numeric wire value
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Map a numeric wire value back to a code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::InvalidTransaction,
            2 => Self::PayerAccountNotFound,
            3 => Self::InvalidNodeAccount,
            4 => Self::TransactionExpired,
            5 => Self::InvalidTransactionStart,
            6 => Self::InvalidTransactionDuration,
            7 => Self::InvalidSignature,
            8 => Self::MemoTooLong,
            9 => Self::InsufficientTxFee,
            10 => Self::InsufficientPayerBalance,
            11 => Self::DuplicateTransaction,
            12 => Self::Busy,
            13 => Self::NotSupported,
            14 => Self::InvalidFileId,
            15 => Self::InvalidAccountId,
            16 => Self::InvalidContractId,
            17 => Self::InvalidTransactionId,
            18 => Self::ReceiptNotFound,
            19 => Self::RecordNotFound,
            22 => Self::Success,
            23 => Self::FailInvalid,
            24 => Self::FailFee,
            25 => Self::FailBalance,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let address: Address = "0.0.1234".parse().unwrap();
        assert_eq!(address, Address::account(1234));
        assert_eq!(address.to_string(), "0.0.1234");

        assert!("0.1234".parse::<Address>().is_err());
        assert!("0.0.x".parse::<Address>().is_err());
    }

    #[test]
    fn test_gateway_requires_url() {
        assert!(Gateway::new("  ", Address::account(3)).is_err());
        let gateway = Gateway::new("localhost:50211", Address::account(3)).unwrap();
        assert_eq!(gateway.to_string(), "0.0.3 (localhost:50211)");
    }

    #[test]
    fn test_tx_id_parse() {
        let id: TxId = "0.0.2@1568411616.000000448".parse().unwrap();
        assert_eq!(id.payer, Address::account(2));
        assert_eq!(id.valid_start_seconds, 1568411616);
        assert_eq!(id.valid_start_nanos, 448);
        assert_eq!(id.to_string(), "0.0.2@1568411616.000000448");

        assert!("0.0.2".parse::<TxId>().is_err());
        assert!("0.0.2@1.1000000000".parse::<TxId>().is_err());
    }

    #[test]
    fn test_response_code_mapping() {
        assert_eq!(ResponseCode::from_code(12), ResponseCode::Busy);
        assert_eq!(ResponseCode::Busy.code(), 12);
        assert_eq!(ResponseCode::from_code(9999), ResponseCode::Unknown);
        assert_eq!(ResponseCode::default(), ResponseCode::Unknown);
    }

    #[test]
    fn test_json_shape() {
        let id = TxId::new(Address::account(2), 10, 5);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json["payer"]["num"], 2);
        assert_eq!(json["valid_start_nanos"], 5);
        assert_eq!(serde_json::to_string(&ResponseCode::Busy).unwrap(), "\"Busy\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn address_text_form_parses_back(shard in any::<u64>(), realm in any::<u64>(), num in any::<u64>()) {
            let address = Address::new(shard, realm, num);
            prop_assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
        }

        #[test]
        fn tx_id_text_form_parses_back(
            num in any::<u64>(),
            seconds in 0i64..=i64::MAX,
            nanos in 0i32..1_000_000_000,
        ) {
            let id = TxId::new(Address::account(num), seconds, nanos);
            prop_assert_eq!(id.to_string().parse::<TxId>().unwrap(), id);
        }

        #[test]
        fn response_code_numbers_are_stable(code in -5i32..40) {
            let mapped = ResponseCode::from_code(code);
            if mapped != ResponseCode::Unknown {
                prop_assert_eq!(mapped.code(), code);
            }
        }
    }
}
