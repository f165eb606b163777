//! Bearer-token providers.
//!
//! [`ShopClient`](crate::ShopClient) asks its [`TokenProvider`] for a token
//! before every request. Acquiring and refreshing tokens is entirely the
//! provider's business; the client only attaches what it is given.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use sweetshop_core::{AppConfig, AuthMode};
use tokio::sync::Mutex;

use crate::client::{normalise_base_url, rejection_from_response};
use crate::error::ClientError;

/// Supplies the bearer token attached to outgoing requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the current token, or `None` to send the request unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when a token should exist but could not be
    /// obtained.
    async fn token(&self) -> Result<Option<String>, ClientError>;

    /// Drops any cached token so the next call re-acquires one.
    async fn invalidate(&self) {}
}

/// Sends every request unauthenticated. Enough for catalog browsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

#[async_trait]
impl TokenProvider for NoAuth {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

/// A token issued by the external identity provider, used as-is.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(Some(self.token.clone()))
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Legacy email/password login against the backend's `POST /auth/login`.
///
/// Logs in lazily on the first [`token`](TokenProvider::token) call and
/// caches the returned token until [`invalidate`](TokenProvider::invalidate).
pub struct LocalLogin {
    client: Client,
    login_url: Url,
    email: String,
    password: String,
    cached: Mutex<Option<String>>,
}

impl LocalLogin {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built, or
    /// [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        email: &str,
        password: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let login_url = normalise_base_url(base_url)?
            .join("auth/login")
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            login_url,
            email: email.to_owned(),
            password: password.to_owned(),
            cached: Mutex::new(None),
        })
    }

    async fn login(&self) -> Result<String, ClientError> {
        tracing::debug!(email = %self.email, "logging in with local credentials");
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let rejection = rejection_from_response(response).await;
            return Err(ClientError::Auth(
                rejection.user_message("login rejected by backend"),
            ));
        }

        let body = response.text().await?;
        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: "POST auth/login".to_string(),
                source: e,
            })?;
        Ok(parsed.token)
    }
}

impl std::fmt::Debug for LocalLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLogin")
            .field("login_url", &self.login_url.as_str())
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for LocalLogin {
    async fn token(&self) -> Result<Option<String>, ClientError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(Some(token.clone()));
        }
        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(Some(token))
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

/// Builds the token provider for the configured auth mode.
///
/// Identity-provider mode without a configured token falls back to
/// [`NoAuth`]: catalog browsing still works, everything else is rejected by
/// the backend.
///
/// # Errors
///
/// Returns [`ClientError`] if local-auth mode is missing credentials or the
/// login client cannot be built.
pub fn token_provider_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn TokenProvider>, ClientError> {
    match config.auth_mode {
        AuthMode::IdentityProvider => match &config.api_token {
            Some(token) => Ok(Arc::new(StaticToken::new(token.clone()))),
            None => {
                tracing::debug!("no API token configured; requests are unauthenticated");
                Ok(Arc::new(NoAuth))
            }
        },
        AuthMode::Local => {
            let (Some(email), Some(password)) = (&config.local_email, &config.local_password)
            else {
                return Err(ClientError::Auth(
                    "local auth mode requires an email and password".to_string(),
                ));
            };
            let provider = LocalLogin::new(
                &config.api_url,
                config.request_timeout_secs,
                email,
                password,
            )?;
            Ok(Arc::new(provider))
        }
    }
}
