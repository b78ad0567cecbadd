//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheap to clone (`Arc` inside)
//! - Public endpoints (catalogue, OTP) are sent without a token
//! - Authenticated endpoints attach the stored access token. A 401 triggers
//!   one refresh-and-retry. Concurrent 401s share a single refresh call.
//! - A failed refresh clears the stored tokens and yields
//!   [`ApiError::SessionExpired`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_client::api::ApiClient;
//!
//! let api = ApiClient::new(&config, tokens)?;
//! let page = api.list_products(1, 20).await?;
//! let cart = api.get_cart().await?;
//! ```

mod auth;
mod cart;
mod orders;
mod payments;
mod products;
mod users;

pub use auth::OtpSent;
pub use products::MAX_PAGE_SIZE;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::storage::{StorageError, TokenStore};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend returned a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        /// Server-provided `detail`, when present.
        message: String,
    },

    /// An authenticated call was made without a stored token.
    #[error("Not signed in")]
    Unauthorized,

    /// The session could not be refreshed; tokens have been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Token storage failed.
    #[error("Token storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status code, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// Message safe to show to a user, if the backend supplied one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// How a request is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// No token, no refresh.
    Public,
    /// Bearer token with one refresh-and-retry on 401.
    Bearer,
    /// Bearer token, no refresh.
    BearerOnce,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStore,
    // Held for the duration of a refresh so concurrent 401s wait for it.
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                tokens,
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// Token store backing this client.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// Resolve an endpoint path (e.g. `cart/add`) against the API base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn public<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(method, path, &[], body, Access::Public).await
    }

    async fn authed<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(method, path, &[], body, Access::Bearer).await
    }

    async fn public_query<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute::<T, ()>(Method::GET, path, query, None, Access::Public)
            .await
    }

    async fn authed_query<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute::<T, ()>(Method::GET, path, query, None, Access::Bearer)
            .await
    }

    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        access: Access,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;

        if access == Access::Public {
            let response = self.send(&method, &url, query, body, None).await?;
            return Self::decode(response).await;
        }

        let token = self
            .inner
            .tokens
            .access_token()?
            .ok_or(ApiError::Unauthorized)?;

        let response = self.send(&method, &url, query, body, Some(&token)).await?;
        if access == Access::BearerOnce || response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        debug!(path = %path, "Access token rejected, refreshing");
        let fresh = self.refresh_after_unauthorized(&token).await?;

        let response = self.send(&method, &url, query, body, Some(&fresh)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %path, "Request rejected after token refresh");
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        Self::decode(response).await
    }

    async fn send<B>(
        &self,
        method: &Method,
        url: &Url,
        query: &[(&str, String)],
        body: Option<&B>,
        token: Option<&SecretString>,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut url = url.clone();
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let mut request = self.inner.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_detail(&text);
            debug!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Token refresh
    // =========================================================================

    /// Obtain a fresh access token after `stale` was rejected.
    ///
    /// Only one refresh runs at a time. A caller that waited on the lock and
    /// finds the stored token already replaced reuses it without calling the
    /// backend again.
    #[instrument(skip_all)]
    async fn refresh_after_unauthorized(
        &self,
        stale: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let _guard = self.inner.refresh_lock.lock().await;

        if let Some(current) = self.inner.tokens.access_token()?
            && current.expose_secret() != stale.expose_secret()
        {
            debug!("Token already refreshed by a concurrent request");
            return Ok(current);
        }

        let Some(refresh_token) = self.inner.tokens.refresh_token()? else {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };

        match self.refresh(&refresh_token).await {
            Ok(tokens) => {
                self.inner.tokens.save(&tokens)?;
                Ok(tokens.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.expire_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    fn expire_session(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "Failed to clear tokens after session expiry");
        }
    }
}

/// Extract the user-facing message from an error body.
///
/// The backend uses `{"detail": "..."}`. Validation failures carry a list of
/// `{"msg": ...}` objects instead.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return String::new();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}
