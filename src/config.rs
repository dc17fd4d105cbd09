use std::fmt;
use std::time::Duration;

use crate::error::PayGateError;

pub(crate) const DEFAULT_CLIENT_IP: &str = "127.0.0.1";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

const ENV_BASE_URL: &str = "PAYGATE_BASE_URL";
const ENV_APP_ID: &str = "PAYGATE_APP_ID";
const ENV_API_KEY: &str = "PAYGATE_API_KEY";
const ENV_CLIENT_IP: &str = "PAYGATE_CLIENT_IP";
const ENV_TIMEOUT_MS: &str = "PAYGATE_TIMEOUT_MS";

pub struct ClientConfig {
    /// Gateway root, never with a trailing slash.
    pub base_url: String,
    pub app_id: String,
    /// Signing secret. Only ever fed into the signer.
    pub api_key: String,
    pub client_ip: String,
    pub timeout: Duration,
    pub http_client: Option<reqwest::Client>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("client_ip", &self.client_ip)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    app_id: Option<String>,
    api_key: Option<String>,
    client_ip: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

impl ClientConfigBuilder {
    /// Start from `PAYGATE_*` environment variables. Anything set afterwards
    /// on the builder wins.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup(ENV_BASE_URL),
            app_id: lookup(ENV_APP_ID),
            api_key: lookup(ENV_API_KEY),
            client_ip: lookup(ENV_CLIENT_IP),
            timeout: lookup(ENV_TIMEOUT_MS)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis),
            http_client: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, timeout_ms: u64) -> Self {
        self.timeout(Duration::from_millis(timeout_ms))
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<ClientConfig, PayGateError> {
        let base_url = required(self.base_url, "base_url")?;
        let app_id = required(self.app_id, "app_id")?;
        let api_key = required(self.api_key, "api_key")?;

        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(PayGateError::Config("base_url is required".into()));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(PayGateError::Config("timeout must be greater than 0".into()));
        }

        let client_ip = self
            .client_ip
            .filter(|ip| !ip.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_IP.to_string());

        Ok(ClientConfig {
            base_url,
            app_id,
            api_key,
            client_ip,
            timeout,
            http_client: self.http_client,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, PayGateError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PayGateError::Config(format!("{name} is required")))
}
