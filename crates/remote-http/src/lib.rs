//! HTTP fallback transport for the daybook row store.
//!
//! Implements the core's [`RemoteStore`] trait against a REST row API with
//! Bearer authentication. Used as the secondary commit path when the
//! primary transport fails for a retryable reason; it can equally serve as
//! the only transport in headless deployments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use daybook_core::errors::{CoreError, Result};
use daybook_core::records::EntityKind;
use daybook_core::store::RemoteStore;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Access-token seam; the host owns session refresh.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Fixed-token provider for tests and one-shot tools.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self(token.into()))
    }
}

impl AccessTokenProvider for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Error body shape the row API returns on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Whether an HTTP status is worth a retry elsewhere.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

fn is_retryable_transport_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

fn preview(body: &str) -> String {
    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    preview
}

/// REST client for the row API.
///
/// Endpoints: `GET/POST {base}/rows/{collection}` and
/// `PATCH/DELETE {base}/rows/{collection}/{id}`, rows as JSON objects,
/// scoped to the authenticated principal by the server.
#[derive(Clone)]
pub struct RestRowStore {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RestRowStore {
    /// Create a new row store client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the row API (e.g., "https://api.daybook.app")
    pub fn new(base_url: &str, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|err| CoreError::remote_unreachable(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn rows_url(&self, kind: EntityKind) -> String {
        format!("{}/rows/{}", self.base_url, kind.collection())
    }

    fn row_url(&self, kind: EntityKind, id: &str) -> String {
        format!("{}/rows/{}/{}", self.base_url, kind.collection(), id)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let token = self
            .tokens
            .access_token()
            .ok_or(CoreError::NotAuthenticated)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| CoreError::NotAuthenticated)?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("row API response status: {}", status);
            return;
        }
        debug!("row API error ({}): {}", status, preview(body));
    }

    /// Read a response body, mapping failures into the core taxonomy:
    /// 408/429/5xx and transport errors are retryable, other non-2xx
    /// statuses are store rejections.
    async fn read_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CoreError::remote_unreachable(err.to_string()))?;
        Self::log_response(status, &body);

        if status.is_success() {
            return Ok(body);
        }

        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => format!("HTTP {}: {}", status.as_u16(), parsed.error),
            Err(_) => format!("HTTP {}: {}", status.as_u16(), preview(&body)),
        };

        if is_retryable_status(status.as_u16()) {
            Err(CoreError::remote_unreachable(message))
        } else {
            Err(CoreError::remote_rejected(message))
        }
    }

    fn map_send_error(err: reqwest::Error) -> CoreError {
        if is_retryable_transport_error(&err) {
            CoreError::remote_unreachable(err.to_string())
        } else {
            CoreError::remote_rejected(err.to_string())
        }
    }
}

#[async_trait]
impl RemoteStore for RestRowStore {
    async fn select(&self, kind: EntityKind, principal: &str) -> Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(self.rows_url(kind))
            .headers(self.headers()?)
            .query(&[("owner", principal), ("order", "createdAt.desc")])
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let body = Self::read_response(response).await?;
        serde_json::from_str(&body).map_err(CoreError::from)
    }

    async fn insert(&self, kind: EntityKind, row: serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.rows_url(kind))
            .headers(self.headers()?)
            .json(&row)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let body = Self::read_response(response).await?;
        serde_json::from_str(&body).map_err(CoreError::from)
    }

    async fn update(&self, kind: EntityKind, id: &str, row: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .patch(self.row_url(kind, id))
            .headers(self.headers()?)
            .json(&row)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::read_response(response).await.map(|_| ())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.row_url(kind, id))
            .headers(self.headers()?)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::read_response(response).await.map(|_| ())
    }
}
