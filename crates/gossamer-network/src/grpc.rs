//! # gRPC Transport
//!
//! Production `Connector` and `GatewayService` over tonic HTTP/2 channels.
//! Messages are framed with `BincodeCodec` on the gateway's two unary
//! endpoints.

use async_trait::async_trait;
use http::uri::PathAndQuery;
use std::sync::Arc;
use tonic::transport::{Channel as TonicChannel, Endpoint};
use tonic::{Request, Status};

use crate::channel::Connector;
use crate::codec::BincodeCodec;
use crate::error::{NetworkError, Result};
use crate::message::{Query, Response, Transaction, TransactionResponse};
use crate::service::GatewayService;
use crate::transport::TransportConfig;

/// RPC paths served by gateway nodes
pub mod endpoints {
    pub const SUBMIT_TRANSACTION: &str = "/gossamer.GatewayService/submitTransaction";
    pub const QUERY: &str = "/gossamer.GatewayService/query";
}

/// Opens lazily-connected gRPC channels
#[derive(Clone, Debug, Default)]
pub struct GrpcConnector {
    config: TransportConfig,
}

impl GrpcConnector {
    /// Create a connector with the given transport settings
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Transport settings applied to new channels
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn endpoint(&self, url: &str) -> Result<Endpoint> {
        let uri = if url.contains("://") {
            url.to_string()
        } else {
            format!("http://{}", url)
        };
        let mut endpoint = Endpoint::from_shared(uri).map_err(|e| NetworkError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        endpoint = endpoint
            .connect_timeout(self.config.connect_timeout())
            .tcp_nodelay(self.config.tcp_nodelay);
        if let Some(timeout) = self.config.request_timeout() {
            endpoint = endpoint.timeout(timeout);
        }
        if let Some(interval) = self.config.keepalive_interval() {
            endpoint = endpoint.http2_keep_alive_interval(interval);
        }
        Ok(endpoint)
    }
}

impl Connector for GrpcConnector {
    fn connect(&self, url: &str) -> Result<Arc<dyn GatewayService>> {
        let channel = self.endpoint(url)?.connect_lazy();
        Ok(Arc::new(GrpcGatewayService::new(channel)))
    }
}

/// Gateway service reached over a tonic channel
#[derive(Clone, Debug)]
pub struct GrpcGatewayService {
    channel: TonicChannel,
}

impl GrpcGatewayService {
    pub fn new(channel: TonicChannel) -> Self {
        Self { channel }
    }

    async fn unary<Req, Resp>(&self, message: Req, path: &'static str) -> std::result::Result<Resp, Status>
    where
        Req: serde::Serialize + Send + Sync + 'static,
        Resp: serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("Gateway was not ready: {}", e)))?;
        let response = grpc
            .unary(
                Request::new(message),
                PathAndQuery::from_static(path),
                BincodeCodec::<Req, Resp>::default(),
            )
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl GatewayService for GrpcGatewayService {
    async fn submit_transaction(&self, transaction: Transaction) -> std::result::Result<TransactionResponse, Status> {
        self.unary(transaction, endpoints::SUBMIT_TRANSACTION).await
    }

    async fn query(&self, query: Query) -> std::result::Result<Response, Status> {
        self.unary(query, endpoints::QUERY).await
    }
}
