//! # Execution Context
//!
//! Configuration for network calls, inherited down a chain of frames.
//!
//! ```text
//!   root ──────────── gateway=0.0.3, payer=0.0.2, signatory=K
//!    │                channel cache (shared by the whole lineage)
//!    ├── child ────── retry_count=10
//!    │    └── child ─ memo="batch 7"
//!    └── child ────── gateway=0.0.4
//! ```
//!
//! Each frame holds a sparse set of overrides. Reads walk from the frame up
//! to the root and fall back to a built-in default; writes only ever touch
//! the frame they are made on. Children are cheap handles: dropping one
//! releases nothing the parent can still see.
//!
//! Observers are the exception to nearest-wins resolution: every observer
//! registered anywhere in the chain is called, root first.

use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use gossamer_core::{Address, Gateway, TxId};
use gossamer_crypto::Signatory;
use gossamer_network::{Channel, ChannelCache, Connector, WireMessage};

use crate::error::{ClientError, Result};

/// Default maximum transaction fee, in tinybars
pub const DEFAULT_FEE_LIMIT: u64 = 100_000;

/// Default transaction validity window
pub const DEFAULT_TRANSACTION_DURATION: Duration = Duration::from_secs(120);

/// Default number of attempts before the final send
pub const DEFAULT_RETRY_COUNT: usize = 5;

/// Default backoff unit
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Called once with every outgoing request
pub type SendingObserver = Arc<dyn Fn(&dyn WireMessage) + Send + Sync>;

/// Called with the attempt number and every response or transport notice
pub type ReceivedObserver = Arc<dyn Fn(usize, &dyn WireMessage) + Send + Sync>;

/// Configuration fields a context frame can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Gateway,
    Payer,
    Signatory,
    FeeLimit,
    TransactionDuration,
    RetryCount,
    RetryDelay,
    Memo,
    AdjustForClockDrift,
    Transaction,
    OnSendingRequest,
    OnResponseReceived,
}

impl Field {
    /// Every configurable field
    pub const ALL: [Field; 12] = [
        Field::Gateway,
        Field::Payer,
        Field::Signatory,
        Field::FeeLimit,
        Field::TransactionDuration,
        Field::RetryCount,
        Field::RetryDelay,
        Field::Memo,
        Field::AdjustForClockDrift,
        Field::Transaction,
        Field::OnSendingRequest,
        Field::OnResponseReceived,
    ];

    /// Field name as used in configuration and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Field::Gateway => "gateway",
            Field::Payer => "payer",
            Field::Signatory => "signatory",
            Field::FeeLimit => "fee_limit",
            Field::TransactionDuration => "transaction_duration",
            Field::RetryCount => "retry_count",
            Field::RetryDelay => "retry_delay",
            Field::Memo => "memo",
            Field::AdjustForClockDrift => "adjust_for_clock_drift",
            Field::Transaction => "transaction",
            Field::OnSendingRequest => "on_sending_request",
            Field::OnResponseReceived => "on_response_received",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| ClientError::UnknownField(s.to_string()))
    }
}

/// A value written to a context field by name
#[derive(Clone)]
pub enum Value {
    Gateway(Gateway),
    Address(Address),
    Signatory(Signatory),
    Amount(u64),
    Count(usize),
    Duration(Duration),
    Text(String),
    Flag(bool),
    TxId(TxId),
    SendingObserver(SendingObserver),
    ReceivedObserver(ReceivedObserver),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Gateway(_) => "gateway",
            Value::Address(_) => "address",
            Value::Signatory(_) => "signatory",
            Value::Amount(_) => "amount",
            Value::Count(_) => "count",
            Value::Duration(_) => "duration",
            Value::Text(_) => "text",
            Value::Flag(_) => "flag",
            Value::TxId(_) => "transaction id",
            Value::SendingObserver(_) => "sending observer",
            Value::ReceivedObserver(_) => "received observer",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.kind())
    }
}

#[derive(Clone, Default)]
struct Settings {
    gateway: Option<Gateway>,
    payer: Option<Address>,
    signatory: Option<Signatory>,
    fee_limit: Option<u64>,
    transaction_duration: Option<Duration>,
    retry_count: Option<usize>,
    retry_delay: Option<Duration>,
    memo: Option<String>,
    adjust_for_clock_drift: Option<bool>,
    transaction: Option<TxId>,
    on_sending_request: Option<SendingObserver>,
    on_response_received: Option<ReceivedObserver>,
}

impl Settings {
    fn is_set(&self, field: Field) -> bool {
        match field {
            Field::Gateway => self.gateway.is_some(),
            Field::Payer => self.payer.is_some(),
            Field::Signatory => self.signatory.is_some(),
            Field::FeeLimit => self.fee_limit.is_some(),
            Field::TransactionDuration => self.transaction_duration.is_some(),
            Field::RetryCount => self.retry_count.is_some(),
            Field::RetryDelay => self.retry_delay.is_some(),
            Field::Memo => self.memo.is_some(),
            Field::AdjustForClockDrift => self.adjust_for_clock_drift.is_some(),
            Field::Transaction => self.transaction.is_some(),
            Field::OnSendingRequest => self.on_sending_request.is_some(),
            Field::OnResponseReceived => self.on_response_received.is_some(),
        }
    }

    fn clear(&mut self, field: Field) {
        match field {
            Field::Gateway => self.gateway = None,
            Field::Payer => self.payer = None,
            Field::Signatory => self.signatory = None,
            Field::FeeLimit => self.fee_limit = None,
            Field::TransactionDuration => self.transaction_duration = None,
            Field::RetryCount => self.retry_count = None,
            Field::RetryDelay => self.retry_delay = None,
            Field::Memo => self.memo = None,
            Field::AdjustForClockDrift => self.adjust_for_clock_drift = None,
            Field::Transaction => self.transaction = None,
            Field::OnSendingRequest => self.on_sending_request = None,
            Field::OnResponseReceived => self.on_response_received = None,
        }
    }

    fn assign(&mut self, field: Field, value: Value) -> Result<()> {
        match (field, value) {
            (Field::Gateway, Value::Gateway(v)) => self.gateway = Some(v),
            (Field::Payer, Value::Address(v)) => self.payer = Some(v),
            (Field::Signatory, Value::Signatory(v)) => self.signatory = Some(v),
            (Field::FeeLimit, Value::Amount(v)) => self.fee_limit = Some(v),
            (Field::TransactionDuration, Value::Duration(v)) => self.transaction_duration = Some(v),
            (Field::RetryCount, Value::Count(v)) => self.retry_count = Some(v),
            (Field::RetryDelay, Value::Duration(v)) => self.retry_delay = Some(v),
            (Field::Memo, Value::Text(v)) => self.memo = Some(v),
            (Field::AdjustForClockDrift, Value::Flag(v)) => self.adjust_for_clock_drift = Some(v),
            (Field::Transaction, Value::TxId(v)) => self.transaction = Some(v),
            (Field::OnSendingRequest, Value::SendingObserver(v)) => self.on_sending_request = Some(v),
            (Field::OnResponseReceived, Value::ReceivedObserver(v)) => {
                self.on_response_received = Some(v)
            }
            (field, _) => {
                return Err(ClientError::InvalidValue {
                    field: field.name(),
                    expected: expected_kind(field),
                })
            }
        }
        Ok(())
    }
}

fn expected_kind(field: Field) -> &'static str {
    match field {
        Field::Gateway => "gateway",
        Field::Payer => "address",
        Field::Signatory => "signatory",
        Field::FeeLimit => "amount",
        Field::TransactionDuration | Field::RetryDelay => "duration",
        Field::RetryCount => "count",
        Field::Memo => "text",
        Field::AdjustForClockDrift => "flag",
        Field::Transaction => "transaction id",
        Field::OnSendingRequest => "sending observer",
        Field::OnResponseReceived => "received observer",
    }
}

struct Frame {
    parent: Option<Arc<Frame>>,
    settings: RwLock<Settings>,
    channels: Arc<ChannelCache>,
    cancellation: CancellationToken,
}

impl Frame {
    /// Frames from this one up to the root
    fn lineage(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(Some(self), |frame| frame.parent.as_deref())
    }
}

/// Handle to one frame of a context chain
///
/// Cloning the handle shares the frame; use `child` to get a frame whose
/// overrides do not leak back to this one.
#[derive(Clone)]
pub struct Context {
    frame: Arc<Frame>,
}

impl Context {
    /// Create a root context that opens channels through `connector`
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            frame: Arc::new(Frame {
                parent: None,
                settings: RwLock::new(Settings::default()),
                channels: Arc::new(ChannelCache::new(connector)),
                cancellation: CancellationToken::new(),
            }),
        }
    }

    /// Create an empty child frame
    pub fn child(&self) -> Context {
        Self {
            frame: Arc::new(Frame {
                parent: Some(self.frame.clone()),
                settings: RwLock::new(Settings::default()),
                channels: self.frame.channels.clone(),
                cancellation: self.frame.cancellation.child_token(),
            }),
        }
    }

    /// Create a child frame and configure it before handing it out
    pub fn child_with<F>(&self, configure: F) -> Context
    where
        F: FnOnce(&Context),
    {
        let child = self.child();
        configure(&child);
        child
    }

    /// Whether this is the root of its chain
    pub fn is_root(&self) -> bool {
        self.frame.parent.is_none()
    }

    fn resolve<T>(&self, pick: impl Fn(&Settings) -> Option<T>) -> Option<T> {
        self.frame.lineage().find_map(|frame| pick(&frame.settings.read()))
    }

    /// Nearest gateway in the chain
    pub fn gateway(&self) -> Option<Gateway> {
        self.resolve(|s| s.gateway.clone())
    }

    /// Nearest payer in the chain
    pub fn payer(&self) -> Option<Address> {
        self.resolve(|s| s.payer)
    }

    /// Nearest signatory in the chain
    pub fn signatory(&self) -> Option<Signatory> {
        self.resolve(|s| s.signatory.clone())
    }

    pub fn fee_limit(&self) -> u64 {
        self.resolve(|s| s.fee_limit).unwrap_or(DEFAULT_FEE_LIMIT)
    }

    pub fn transaction_duration(&self) -> Duration {
        self.resolve(|s| s.transaction_duration)
            .unwrap_or(DEFAULT_TRANSACTION_DURATION)
    }

    pub fn retry_count(&self) -> usize {
        self.resolve(|s| s.retry_count).unwrap_or(DEFAULT_RETRY_COUNT)
    }

    pub fn retry_delay(&self) -> Duration {
        self.resolve(|s| s.retry_delay).unwrap_or(DEFAULT_RETRY_DELAY)
    }

    pub fn memo(&self) -> String {
        self.resolve(|s| s.memo.clone()).unwrap_or_default()
    }

    pub fn adjust_for_clock_drift(&self) -> bool {
        self.resolve(|s| s.adjust_for_clock_drift).unwrap_or(false)
    }

    /// Pinned transaction id, used instead of generating a fresh one
    pub fn transaction(&self) -> Option<TxId> {
        self.resolve(|s| s.transaction)
    }

    /// Every sending observer in the chain, root first
    pub fn sending_observers(&self) -> Vec<SendingObserver> {
        self.gather(|s| s.on_sending_request.clone())
    }

    /// Every response observer in the chain, root first
    pub fn received_observers(&self) -> Vec<ReceivedObserver> {
        self.gather(|s| s.on_response_received.clone())
    }

    fn gather<T>(&self, pick: impl Fn(&Settings) -> Option<T>) -> Vec<T> {
        let mut found: Vec<T> = self
            .frame
            .lineage()
            .filter_map(|frame| pick(&frame.settings.read()))
            .collect();
        found.reverse();
        found
    }

    fn update(&self, apply: impl FnOnce(&mut Settings)) {
        apply(&mut self.frame.settings.write());
    }

    pub fn set_gateway(&self, gateway: Gateway) {
        self.update(|s| s.gateway = Some(gateway));
    }

    pub fn set_payer(&self, payer: Address) {
        self.update(|s| s.payer = Some(payer));
    }

    pub fn set_signatory(&self, signatory: Signatory) {
        self.update(|s| s.signatory = Some(signatory));
    }

    pub fn set_fee_limit(&self, fee_limit: u64) {
        self.update(|s| s.fee_limit = Some(fee_limit));
    }

    pub fn set_transaction_duration(&self, duration: Duration) {
        self.update(|s| s.transaction_duration = Some(duration));
    }

    pub fn set_retry_count(&self, retry_count: usize) {
        self.update(|s| s.retry_count = Some(retry_count));
    }

    pub fn set_retry_delay(&self, retry_delay: Duration) {
        self.update(|s| s.retry_delay = Some(retry_delay));
    }

    pub fn set_memo(&self, memo: impl Into<String>) {
        let memo = memo.into();
        self.update(|s| s.memo = Some(memo));
    }

    pub fn set_adjust_for_clock_drift(&self, adjust: bool) {
        self.update(|s| s.adjust_for_clock_drift = Some(adjust));
    }

    /// Pin the transaction id for calls made through this frame
    pub fn set_transaction(&self, tx_id: TxId) {
        self.update(|s| s.transaction = Some(tx_id));
    }

    /// Register this frame's sending observer, replacing any previous one
    pub fn on_sending_request<F>(&self, observer: F)
    where
        F: Fn(&dyn WireMessage) + Send + Sync + 'static,
    {
        let observer: SendingObserver = Arc::new(observer);
        self.update(|s| s.on_sending_request = Some(observer));
    }

    /// Register this frame's response observer, replacing any previous one
    pub fn on_response_received<F>(&self, observer: F)
    where
        F: Fn(usize, &dyn WireMessage) + Send + Sync + 'static,
    {
        let observer: ReceivedObserver = Arc::new(observer);
        self.update(|s| s.on_response_received = Some(observer));
    }

    /// Write a field by name
    ///
    /// Fails with `UnknownField` for a name outside the configuration
    /// surface and `InvalidValue` when the value has the wrong kind.
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        let field: Field = name.parse()?;
        self.frame.settings.write().assign(field, value)
    }

    /// Remove this frame's override so the inherited value shows through
    pub fn reset(&self, field: Field) {
        self.update(|s| s.clear(field));
    }

    /// Whether this frame (not an ancestor) overrides `field`
    pub fn is_overridden(&self, field: Field) -> bool {
        self.frame.settings.read().is_set(field)
    }

    pub fn require_gateway(&self) -> Result<Gateway> {
        self.gateway()
            .ok_or(ClientError::Configuration { field: "gateway" })
    }

    pub fn require_payer(&self) -> Result<Address> {
        self.payer().ok_or(ClientError::Configuration { field: "payer" })
    }

    pub fn require_signatory(&self) -> Result<Signatory> {
        self.signatory()
            .ok_or(ClientError::Configuration { field: "signatory" })
    }

    /// Channel to the nearest gateway, opened on first use
    pub fn channel(&self) -> Result<Channel> {
        let gateway = self.require_gateway()?;
        Ok(self.frame.channels.get_or_connect(&gateway.url)?)
    }

    /// Number of channels open in this lineage
    pub fn open_channels(&self) -> usize {
        self.frame.channels.len()
    }

    /// Cancel every call running in this context or its descendants
    pub fn cancel(&self) {
        self.frame.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.frame.cancellation.is_cancelled()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.frame.cancellation
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.is_root())
            .field("gateway", &self.gateway())
            .field("payer", &self.payer())
            .field("retry_count", &self.retry_count())
            .finish_non_exhaustive()
    }
}
