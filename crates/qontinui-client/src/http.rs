//! reqwest-backed [`Backend`]

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};

use crate::backend::{ApiRequest, Backend, RequestBody};
use crate::{Error, Result, Settings};

/// HTTP client for the Qontinui API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the configured URL and timeout.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("qontinui-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, &settings.api_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value> {
        let ApiRequest {
            method,
            path,
            query,
            body,
        } = request;

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder.form(&pairs),
        };

        let response = builder.send().await.inspect_err(|e| {
            tracing::warn!(%method, %path, error = %e, "Backend request failed");
        })?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%method, %path, status = status.as_u16(), "Backend response");

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: error_message(status, &bytes),
            });
        }

        parse_body(&bytes)
    }
}

/// Parse a success body; empty bodies (204 and friends) become `{}`.
fn parse_body(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(bytes).map_err(|e| Error::Decode {
        message: e.to_string(),
    })
}

/// Extract the most useful message from an error body.
///
/// FastAPI puts it in `detail`, either a string or a list of validation entries.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        match value.get("detail").or_else(|| value.get("message")) {
            Some(Value::String(detail)) => return detail.clone(),
            Some(detail) if !detail.is_null() => return detail.to_string(),
            _ => {}
        }
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
