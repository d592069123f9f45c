//! Client configuration
//!
//! Settings are read from a TOML file and overridden by `GOSSAMER__*`
//! environment variables, e.g. `GOSSAMER__RETRY__COUNT=10`.
//!
//! ```toml
//! [network]
//! gateway_url = "testnet.example:50211"
//! gateway_account = "0.0.3"
//!
//! [account]
//! payer = "0.0.1001"
//! private_key = "302e020100300506032b657004220420..."
//!
//! [retry]
//! count = 5
//! delay_ms = 200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use gossamer_core::{Address, Gateway};
use gossamer_crypto::{CryptoError, Signatory};
use gossamer_network::TransportConfig;

use crate::context::{
    Context, DEFAULT_FEE_LIMIT, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY,
    DEFAULT_TRANSACTION_DURATION,
};
use crate::error::{ClientError, Result};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "GOSSAMER";

/// Top-level client configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub account: AccountSettings,

    #[serde(default)]
    pub transaction: TransactionSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Gateway and transport
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Gateway endpoint
    pub gateway_url: Option<String>,

    /// Gateway node account (`shard.realm.num`)
    pub gateway_account: Option<String>,

    /// gRPC channel tuning
    pub transport: TransportConfig,
}

/// Paying account and its key
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Payer account (`shard.realm.num`)
    pub payer: Option<String>,

    /// Ed25519 private key, hex (raw seed or PKCS#8)
    pub private_key: Option<String>,
}

impl std::fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSettings")
            .field("payer", &self.payer)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Transaction defaults
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionSettings {
    /// Maximum fee, tinybars
    pub fee_limit: u64,

    /// Validity window (seconds)
    pub duration_secs: u64,

    pub memo: String,

    /// Shift valid-start times by the observed clock drift
    pub adjust_for_clock_drift: bool,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            fee_limit: DEFAULT_FEE_LIMIT,
            duration_secs: DEFAULT_TRANSACTION_DURATION.as_secs(),
            memo: String::new(),
            adjust_for_clock_drift: false,
        }
    }
}

/// Retry policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts before the final send
    pub count: usize,

    /// Backoff unit (ms)
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_RETRY_COUNT,
            delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

/// Log output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ClientConfig {
    /// Load from a file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: ClientConfig = settings.try_deserialize()?;
        tracing::debug!(path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write these settings into a context frame
    pub fn apply(&self, context: &Context) -> Result<()> {
        match (&self.network.gateway_url, &self.network.gateway_account) {
            (Some(url), Some(account)) => {
                context.set_gateway(Gateway::new(url.clone(), account.parse::<Address>()?)?);
            }
            (None, None) => {}
            _ => return Err(ClientError::Configuration { field: "gateway" }),
        }
        if let Some(payer) = &self.account.payer {
            context.set_payer(payer.parse::<Address>()?);
        }
        if let Some(key) = &self.account.private_key {
            let bytes = hex::decode(key.trim().trim_start_matches("0x"))
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
            context.set_signatory(Signatory::from_private_key(&bytes)?);
        }

        context.set_fee_limit(self.transaction.fee_limit);
        context.set_transaction_duration(Duration::from_secs(self.transaction.duration_secs));
        context.set_memo(self.transaction.memo.clone());
        context.set_adjust_for_clock_drift(self.transaction.adjust_for_clock_drift);
        context.set_retry_count(self.retry.count);
        context.set_retry_delay(Duration::from_millis(self.retry.delay_ms));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossamer_network::GrpcConnector;
    use std::sync::Arc;

    const SAMPLE: &str = r#"
[network]
gateway_url = "127.0.0.1:50211"
gateway_account = "0.0.3"

[network.transport]
connect_timeout_ms = 2500

[account]
payer = "0.0.1001"
private_key = "0707070707070707070707070707070707070707070707070707070707070707"

[retry]
count = 8
"#;

    #[test]
    fn test_defaults_match_context() {
        let config = ClientConfig::default();
        assert_eq!(config.transaction.fee_limit, 100_000);
        assert_eq!(config.transaction.duration_secs, 120);
        assert_eq!(config.retry.count, 5);
        assert_eq!(config.retry.delay_ms, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml() {
        let config = ClientConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.network.gateway_account.as_deref(), Some("0.0.3"));
        assert_eq!(config.network.transport.connect_timeout_ms, 2500);
        assert!(config.network.transport.tcp_nodelay);
        assert_eq!(config.retry.count, 8);
        assert_eq!(config.retry.delay_ms, 200);
        assert!(!format!("{:?}", config.account).contains("0707"));
    }

    #[tokio::test]
    async fn test_apply_to_context() {
        let config = ClientConfig::from_toml(SAMPLE).unwrap();
        let context = Context::new(Arc::new(GrpcConnector::default()));
        config.apply(&context).unwrap();

        assert_eq!(context.payer(), Some(Address::account(1001)));
        assert_eq!(context.gateway().unwrap().address, Address::account(3));
        assert_eq!(context.retry_count(), 8);
        assert!(context.signatory().is_some());
    }

    #[test]
    fn test_gateway_needs_url_and_account() {
        let config = ClientConfig::from_toml("[network]\ngateway_url = \"node:50211\"\n").unwrap();
        let context = Context::new(Arc::new(GrpcConnector::default()));
        assert!(matches!(
            config.apply(&context),
            Err(ClientError::Configuration { field: "gateway" })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gossamer.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.account.payer.as_deref(), Some("0.0.1001"));
        assert_eq!(config.retry.count, 8);
    }

    #[test]
    fn test_bad_payer_rejected() {
        let config = ClientConfig::from_toml("[account]\npayer = \"not-an-address\"\n").unwrap();
        let context = Context::new(Arc::new(GrpcConnector::default()));
        assert!(matches!(config.apply(&context), Err(ClientError::Core(_))));
    }
}
