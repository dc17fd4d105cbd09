//! HTTP transport seam.
//!
//! The client only ever speaks to the gateway through [`HttpTransport`], so
//! tests and callers with their own HTTP stack can swap in an implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;

const USER_AGENT: &str = concat!("paygate-rust-sdk/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, base URL already joined.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Any response that made it back, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    /// Sent, but no response arrived: timeout, DNS failure, refused or reset connection.
    #[error("no response: {0}")]
    NoResponse(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by `reqwest`.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }

    /// Wrap an existing client. Its own timeout settings apply.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self
            .http
            .request(request.method, &request.url)
            .header("Accept", "application/json");
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        TransportError::NoResponse(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
