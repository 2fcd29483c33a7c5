//! JSON-RPC client.
//!
//! [`ApiClient`] turns typed requests into `(method, params)` pairs and decodes
//! the `result` payload. The wire itself sits behind [`Transport`] so the
//! engine can run against [`HttpTransport`] in production and an in-memory
//! remote in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::method::{Mutation, RpcMethod};
use crate::types::ApiInfoVersion;

/// Content type Zabbix expects on every request.
const JSON_RPC_CONTENT_TYPE: &str = "application/json-rpc";

/// Methods that must be sent without an `Authorization` header.
const UNAUTHENTICATED_METHODS: [&str; 1] = [ApiInfoVersion::METHOD];

/// Moves one JSON-RPC call to the remote system and back.
pub trait Transport {
    /// Send `method` with `params` and return the raw `result` value.
    ///
    /// # Errors
    ///
    /// Returns `Transport`/`Timeout`/`InvalidResponse` when the round trip
    /// fails, or `Remote` when the API answered with an error object.
    fn send(&self, method: &str, params: Value) -> Result<Value>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, method: &str, params: Value) -> Result<Value> {
        (**self).send(method, params)
    }
}

/// Typed client over any [`Transport`].
#[derive(Debug)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Build an HTTP client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when no URL is configured or the HTTP client
    /// cannot be built.
    pub fn connect(config: &ApiConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute any method and decode its response.
    ///
    /// # Errors
    ///
    /// Propagates transport and remote errors; returns `InvalidRequest` or
    /// `InvalidResponse` when encoding or decoding fails.
    pub fn call<M: RpcMethod>(&self, request: &M) -> Result<M::Response> {
        let params = serde_json::to_value(request)
            .map_err(|e| Error::invalid_request(M::METHOD, e.to_string()))?;

        let raw = self.transport.send(M::METHOD, params)?;

        serde_json::from_value(raw).map_err(|e| Error::invalid_response(M::METHOD, e.to_string()))
    }

    /// Execute a mutation and reduce it to its output.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::call`], plus `InvalidResponse` when the response
    /// lacks the created id.
    pub fn execute<M: Mutation>(&self, request: &M) -> Result<M::Output> {
        M::output(self.call(request)?)
    }

    /// Remote API version, e.g. `7.4.0`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::call`].
    pub fn api_version(&self) -> Result<String> {
        self.call(&ApiInfoVersion {})
    }
}

// ============================================================================
// HTTP transport
// ============================================================================

#[derive(Serialize)]
struct Envelope<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Fault>,
}

#[derive(Deserialize)]
struct Fault {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<String>,
}

/// Blocking HTTP transport speaking JSON-RPC 2.0.
#[derive(Debug)]
pub struct HttpTransport {
    http_client: reqwest::blocking::Client,
    endpoint: Url,
    token: Option<String>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when no URL is configured or the client cannot
    /// be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint = config.endpoint()?.clone();

        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config_error(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint,
            token: config.token.clone(),
            timeout: config.timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint requests are posted to.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn bearer(&self, method: &str) -> Option<String> {
        if UNAUTHENTICATED_METHODS.contains(&method) {
            return None;
        }
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }

    fn map_send_error(&self, method: &str, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            Error::timeout(method, timeout_ms)
        } else {
            Error::transport(method, error.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, "Sending JSON-RPC request");

        let mut request = self
            .http_client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_RPC_CONTENT_TYPE));

        if let Some(bearer) = self.bearer(method) {
            request = request.header(AUTHORIZATION, bearer);
        }

        let response = request
            .json(&envelope)
            .send()
            .map_err(|e| self.map_send_error(method, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::transport(
                method,
                format!("API returned {status}: {body}"),
            ));
        }

        let reply: Reply = response.json().map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(method, &e)
            } else {
                Error::invalid_response(method, e.to_string())
            }
        })?;

        match reply {
            Reply {
                error: Some(fault), ..
            } => Err(Error::remote(
                method,
                fault.code,
                fault.message,
                fault.data.unwrap_or_default(),
            )),
            Reply {
                result: Some(result),
                ..
            } => Ok(result),
            Reply { .. } => Err(Error::invalid_response(
                method,
                "response carries neither result nor error",
            )),
        }
    }
}
