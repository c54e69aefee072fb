//! Thin reqwest layer: URL building, status handling and body decoding.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use stocklens_core::StocklensError;

use crate::config::HttpSourceConfig;
use crate::wire::ErrorPayload;

/// Production adapter backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct RealAdapter {
    client: Client,
    base: Url,
}

impl RealAdapter {
    /// Build a client from `cfg`.
    ///
    /// # Errors
    /// `InvalidArg` if the base URL does not parse or cannot carry a path,
    /// `Transport` if the TLS backend fails to initialise.
    pub fn new(cfg: &HttpSourceConfig) -> Result<Self, StocklensError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| StocklensError::Transport(e.to_string()))?;
        Self::with_client(client, &cfg.base_url)
    }

    /// Use an existing client; its own timeout and headers apply.
    ///
    /// # Errors
    /// `InvalidArg` if `base_url` is not a usable base.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, StocklensError> {
        let base = Url::parse(base_url)
            .map_err(|e| StocklensError::InvalidArg(format!("base url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StocklensError::InvalidArg(format!(
                "base url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { client, base })
    }

    /// Base the endpoints are resolved against.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/stock/{symbol}[/{tail}]` with the symbol percent-encoded.
    pub fn endpoint(&self, symbol: &str, tail: Option<&str>) -> Result<Url, StocklensError> {
        let mut url = self.base.clone();
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|()| StocklensError::InvalidArg("base url cannot carry a path".into()))?;
            segs.pop_if_empty().extend(["api", "stock", symbol]);
            if let Some(tail) = tail {
                segs.push(tail);
            }
        }
        Ok(url)
    }

    async fn send(&self, url: Url, params: &[(&str, String)]) -> Result<Response, StocklensError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(map_transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(http_error(status, &body))
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, StocklensError> {
        let body = self.send(url, params).await?.text().await.map_err(map_transport)?;
        serde_json::from_str(&body).map_err(|e| StocklensError::Decode(e.to_string()))
    }

    /// GET a raw text body.
    pub async fn get_text(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<String, StocklensError> {
        self.send(url, params).await?.text().await.map_err(map_transport)
    }
}

fn map_transport(e: reqwest::Error) -> StocklensError {
    if e.is_timeout() {
        StocklensError::Transport("request timed out".into())
    } else if e.is_decode() {
        StocklensError::Decode(e.to_string())
    } else {
        StocklensError::Transport(e.to_string())
    }
}

/// `{detail}` when the backend sent one, the status reason otherwise.
pub fn http_error(status: StatusCode, body: &str) -> StocklensError {
    let message = serde_json::from_str::<ErrorPayload>(body)
        .map(|p| p.detail)
        .ok()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    StocklensError::http(status.as_u16(), message)
}
