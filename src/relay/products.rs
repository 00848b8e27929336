// ────────────────────────────────
// src/relay/products.rs
// Forwards product listing requests to the upstream catalog
// ────────────────────────────────

use crate::config::UpstreamConfig;
use crate::metrics::{MetricsCollector, RelayOutcome};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use reqwest::Client;
use serde_json::value::RawValue;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Message returned to callers whenever the upstream call fails.
pub const FAILURE_MESSAGE: &str = "No se pudieron obtener los productos.";

/// Prefix of the operator log line written on upstream failure.
pub const FAILURE_LOG_TAG: &str = "Error al obtener productos:";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct ProductsRelay {
    client: Client,
    upstream: Url,
    metrics: Arc<MetricsCollector>,
}

impl ProductsRelay {
    pub fn new(config: &UpstreamConfig, metrics: Arc<MetricsCollector>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(RelayError::Client)?;

        Ok(Self {
            client,
            upstream: config.url.clone(),
            metrics,
        })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// Serve an inbound request. Nothing in the request is read.
    pub async fn handle(&self, _req: Request<Body>) -> Response<Body> {
        self.list_products().await
    }

    pub async fn list_products(&self) -> Response<Body> {
        let started = Instant::now();

        match self.fetch_products().await {
            Ok(payload) => {
                self.metrics.record_request(RelayOutcome::Success, started);
                tracing::debug!(bytes = payload.len(), "Relayed upstream product listing");
                json_response(StatusCode::OK, Body::from(payload))
            }
            Err(err) => {
                self.metrics.record_request(RelayOutcome::Failure, started);
                tracing::error!(error = ?err, "{} {}", FAILURE_LOG_TAG, err);
                err.into()
            }
        }
    }

    /// One GET against the upstream. The returned bytes are the upstream body,
    /// checked to be a single JSON value but otherwise untouched.
    pub async fn fetch_products(&self) -> Result<Bytes, RelayError> {
        let response = self
            .client
            .get(self.upstream.clone())
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        serde_json::from_slice::<&RawValue>(&body)?;

        Ok(body)
    }
}

fn json_response(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Any failure of the upstream call: transport, timeout, status, or payload.
    #[error("{0}")]
    UpstreamUnavailable(#[source] BoxError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::UpstreamUnavailable(Box::new(err))
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::UpstreamUnavailable(Box::new(err))
    }
}

// Every failure reaches the caller as the same 500 reply
impl From<RelayError> for Response<Body> {
    fn from(_err: RelayError) -> Self {
        let body = serde_json::json!({ "error": FAILURE_MESSAGE }).to_string();
        json_response(StatusCode::INTERNAL_SERVER_ERROR, Body::from(body))
    }
}
