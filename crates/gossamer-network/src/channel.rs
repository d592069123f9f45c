//! # Gateway Channels
//!
//! A `Channel` is a live connection to one gateway URL. Channels are cached
//! per URL for the lifetime of a context tree, so every child context that
//! talks to the same gateway reuses one connection.
//!
//! ```text
//!   get_or_connect(url)
//!          │
//!     ┌────┴─────┐ occupied ┌──────────────┐
//!     │  DashMap ├─────────►│ clone handle │
//!     │  entry   │          └──────────────┘
//!     └────┬─────┘
//!          │ vacant (shard locked)
//!     ┌────┴──────────────┐
//!     │ Connector::connect│──► insert ──► clone handle
//!     └───────────────────┘
//! ```
//!
//! The vacant branch runs while the entry's shard is locked, so concurrent
//! callers racing for a new URL produce exactly one connection. Connectors
//! must therefore be cheap and non-blocking (gRPC channels connect lazily).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::service::GatewayService;

/// Connection to a single gateway
#[derive(Clone)]
pub struct Channel {
    url: Arc<str>,
    service: Arc<dyn GatewayService>,
}

impl Channel {
    /// Wrap a connected service
    pub fn new(url: impl Into<Arc<str>>, service: Arc<dyn GatewayService>) -> Self {
        Self {
            url: url.into(),
            service,
        }
    }

    /// URL this channel is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// RPC surface of the gateway
    pub fn service(&self) -> &Arc<dyn GatewayService> {
        &self.service
    }

    /// Whether both handles share one underlying connection
    pub fn same_as(&self, other: &Channel) -> bool {
        Arc::ptr_eq(&self.service, &other.service)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").field("url", &self.url).finish()
    }
}

/// Opens connections to gateway URLs
pub trait Connector: Send + Sync {
    /// Create a service for `url`; must not block
    fn connect(&self, url: &str) -> Result<Arc<dyn GatewayService>>;
}

/// Per-URL channel cache shared by a context tree
pub struct ChannelCache {
    connector: Arc<dyn Connector>,
    channels: DashMap<String, Channel>,
}

impl ChannelCache {
    /// Create an empty cache
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            channels: DashMap::new(),
        }
    }

    /// Cached channel for `url`, connecting on first use
    pub fn get_or_connect(&self, url: &str) -> Result<Channel> {
        match self.channels.entry(url.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let service = self.connector.connect(url)?;
                let channel = Channel::new(url, service);
                tracing::debug!(url, "Opened gateway channel");
                entry.insert(channel.clone());
                Ok(channel)
            }
        }
    }

    /// Whether a channel to `url` is cached
    pub fn contains(&self, url: &str) -> bool {
        self.channels.contains_key(url)
    }

    /// Drop the cached channel for `url`
    pub fn evict(&self, url: &str) -> Option<Channel> {
        self.channels.remove(url).map(|(_, channel)| channel)
    }

    /// Number of open channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel has been opened
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl fmt::Debug for ChannelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCache")
            .field("channels", &self.channels.len())
            .finish()
    }
}
