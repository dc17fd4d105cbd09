use std::sync::Arc;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::crypto::sign::sign_md5;
use crate::error::{ApiErrorResponse, PayGateError};
use crate::model::common::{GatewayResponse, SUCCESS_CODE};
use crate::model::params::ParamSet;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

/// Envelope as it arrives, before `data` is given a concrete type.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Client for the PayGate HTTP API.
///
/// Configuration is fixed at construction, so one instance can serve
/// concurrent calls without locking.
pub struct PayGateClient {
    pub(crate) config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl PayGateClient {
    /// Create a client that talks to the gateway over `reqwest`.
    pub fn new(mut config: ClientConfig) -> Result<Self, PayGateError> {
        let transport = match config.http_client.take() {
            Some(http) => ReqwestTransport::from_client(http),
            None => ReqwestTransport::new(config.timeout)?,
        };
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client on top of a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: impl HttpTransport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn client_ip(&self) -> &str {
        &self.config.client_ip
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Compute the signature over `params` and store it under `sign`.
    pub(crate) fn sign(&self, params: &mut ParamSet) {
        let signature = sign_md5(params, &self.config.api_key);
        params.insert("sign", signature);
    }

    /// POST `params` as a JSON body and decode a `code == 1` envelope.
    pub(crate) async fn post_envelope<T>(
        &self,
        path: &str,
        params: &ParamSet,
        fallback: &str,
    ) -> Result<GatewayResponse<T>, PayGateError>
    where
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(params)?;
        let resp = self
            .execute(HttpRequest::post(self.url(path), body), fallback)
            .await?;
        decode_envelope(&resp, fallback)
    }

    /// GET with `params` in the query string and decode a `code == 1` envelope.
    pub(crate) async fn get_envelope<T>(
        &self,
        path: &str,
        params: &ParamSet,
        fallback: &str,
    ) -> Result<GatewayResponse<T>, PayGateError>
    where
        T: DeserializeOwned,
    {
        let req = HttpRequest::get(self.url(path)).with_query(params.to_query_pairs());
        let resp = self.execute(req, fallback).await?;
        decode_envelope(&resp, fallback)
    }

    /// GET and decode the body as-is, without the envelope check.
    pub(crate) async fn get_raw<T>(&self, path: &str, fallback: &str) -> Result<T, PayGateError>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .execute(HttpRequest::get(self.url(path)), fallback)
            .await?;
        serde_json::from_str(&resp.body).map_err(PayGateError::from)
    }

    /// Send a request and turn transport failures and non-2xx answers into errors.
    async fn execute(
        &self,
        request: HttpRequest,
        fallback: &str,
    ) -> Result<HttpResponse, PayGateError> {
        debug!(method = %request.method, url = %request.url, "calling gateway");

        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(TransportError::NoResponse(reason)) => {
                warn!(%reason, "no response from gateway");
                return Err(PayGateError::NoResponse);
            }
            Err(TransportError::Other(reason)) => return Err(PayGateError::Transport(reason)),
        };

        if !resp.is_success() {
            return Err(parse_api_error(&resp, fallback));
        }

        Ok(resp)
    }
}

fn decode_envelope<T>(resp: &HttpResponse, fallback: &str) -> Result<GatewayResponse<T>, PayGateError>
where
    T: DeserializeOwned,
{
    let raw: RawEnvelope = serde_json::from_str(&resp.body)?;

    if raw.code != SUCCESS_CODE {
        let message = raw
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        warn!(code = raw.code, %message, "gateway reported failure");
        return Err(PayGateError::Api {
            code: Some(raw.code),
            status: Some(resp.status),
            message,
        });
    }

    Ok(GatewayResponse {
        code: raw.code,
        message: raw.message.unwrap_or_default(),
        data: serde_json::from_value(raw.data)?,
    })
}

fn parse_api_error(resp: &HttpResponse, fallback: &str) -> PayGateError {
    let message = match serde_json::from_str::<ApiErrorResponse>(&resp.body) {
        Ok(err_resp) => err_resp.reason(),
        Err(_) => Some(resp.body.trim().to_string()).filter(|b| !b.is_empty()),
    }
    .unwrap_or_else(|| fallback.to_string());

    warn!(status = resp.status, %message, "gateway returned error status");
    PayGateError::Api {
        code: None,
        status: Some(resp.status),
        message,
    }
}

/// Percent-encode a string so it is safe to use in a URL path segment.
pub(crate) fn encode_path_segment(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}
