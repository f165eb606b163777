//! HTTP client for the storefront backend's REST API.
//!
//! Wraps `reqwest` with bearer-token injection, typed response decoding, and
//! backend-message extraction for rejected requests. Nothing here retries:
//! every failure is returned to the caller, who decides whether the user
//! should try again.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sweetshop_core::{AppConfig, CoreError, Product, PurchaseRecord, PurchaseRequest, Role, SweetDraft};

use crate::auth::TokenProvider;
use crate::error::ClientError;
use crate::upload::ImageUpload;

/// Longest plain-text error body surfaced as a backend message.
const MAX_PLAIN_MESSAGE_CHARS: usize = 200;

/// A user created through the legacy local registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

/// Client for the storefront REST API.
///
/// Use [`ShopClient::new`] with the loaded configuration, or
/// [`ShopClient::with_base_url`] to point at a mock server in tests.
pub struct ShopClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl ShopClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if the configured URL does not parse.
    pub fn new(config: &AppConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, ClientError> {
        Self::with_base_url(
            &config.api_url,
            config.request_timeout_secs,
            &config.user_agent,
            tokens,
        )
    }

    /// Creates a client with an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: normalise_base_url(base_url)?,
            tokens,
        })
    }

    /// Fetches the full catalog (`GET /sweets`).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the request.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a product list.
    pub async fn list_sweets(&self) -> Result<Vec<Product>, ClientError> {
        let request = self.client.get(self.endpoint("sweets")?);
        self.send_json(request, "GET sweets").await
    }

    /// Creates a sweet (`POST /sweets`, multipart).
    ///
    /// The draft is validated locally first and never sent if invalid.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidInput`] for a draft that fails validation, plus
    /// the errors of [`ShopClient::list_sweets`].
    pub async fn create_sweet(
        &self,
        draft: SweetDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let form = sweet_form(draft, image)?;
        let request = self.client.post(self.endpoint("sweets")?).multipart(form);
        let product: Product = self.send_json(request, "POST sweets").await?;
        tracing::info!(sweet_id = product.id, name = %product.name, "sweet created");
        Ok(product)
    }

    /// Replaces a sweet's details (`PUT /sweets/{id}`, multipart).
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::create_sweet`].
    pub async fn update_sweet(
        &self,
        id: i64,
        draft: SweetDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let form = sweet_form(draft, image)?;
        let request = self
            .client
            .put(self.endpoint(&format!("sweets/{id}"))?)
            .multipart(form);
        let product: Product = self.send_json(request, &format!("PUT sweets/{id}")).await?;
        tracing::info!(sweet_id = id, "sweet updated");
        Ok(product)
    }

    /// Deletes a sweet (`DELETE /sweets/{id}`).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the backend rejects the request.
    /// - [`ClientError::Http`] on network failure.
    pub async fn delete_sweet(&self, id: i64) -> Result<(), ClientError> {
        let request = self.client.delete(self.endpoint(&format!("sweets/{id}"))?);
        self.execute(request).await?;
        tracing::info!(sweet_id = id, "sweet deleted");
        Ok(())
    }

    /// Adds `quantity` units to a sweet's stock (`POST /sweets/{id}/restock`).
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidInput`] when `quantity` is zero, plus the errors
    /// of [`ShopClient::list_sweets`].
    pub async fn restock_sweet(&self, id: i64, quantity: u32) -> Result<Product, ClientError> {
        if quantity == 0 {
            return Err(CoreError::InvalidRestockQuantity(quantity.to_string()).into());
        }
        let request = self
            .client
            .post(self.endpoint(&format!("sweets/{id}/restock"))?)
            .json(&quantity);
        let product: Product = self
            .send_json(request, &format!("POST sweets/{id}/restock"))
            .await?;
        tracing::info!(sweet_id = id, quantity, stock = product.quantity, "sweet restocked");
        Ok(product)
    }

    /// Submits a confirmed purchase (`POST /sweets/{id}/purchase`).
    ///
    /// The backend decrements stock and records the purchase; it rejects the
    /// request if the quantity exceeds current stock.
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::list_sweets`].
    pub async fn purchase_sweet(
        &self,
        request: PurchaseRequest,
    ) -> Result<PurchaseRecord, ClientError> {
        let id = request.product_id;
        let http = self
            .client
            .post(self.endpoint(&format!("sweets/{id}/purchase"))?)
            .json(&request.quantity);
        let record: PurchaseRecord = self
            .send_json(http, &format!("POST sweets/{id}/purchase"))
            .await?;
        tracing::info!(
            sweet_id = id,
            quantity = record.quantity,
            total = %record.total_price,
            "purchase recorded"
        );
        Ok(record)
    }

    /// The signed-in user's purchase history (`GET /purchases/my`).
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::list_sweets`].
    pub async fn my_purchases(&self) -> Result<Vec<PurchaseRecord>, ClientError> {
        let request = self.client.get(self.endpoint("purchases/my")?);
        self.send_json(request, "GET purchases/my").await
    }

    /// Every purchase across all customers (`GET /purchases/all`, admin only).
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::list_sweets`].
    pub async fn all_purchases(&self) -> Result<Vec<PurchaseRecord>, ClientError> {
        let request = self.client.get(self.endpoint("purchases/all")?);
        self.send_json(request, "GET purchases/all").await
    }

    /// Image URL suggestions for a product name (`GET /images/search`, admin only).
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::list_sweets`].
    pub async fn search_images(&self, query: &str) -> Result<Vec<String>, ClientError> {
        let mut url = self.endpoint("images/search")?;
        url.query_pairs_mut().append_pair("query", query);
        let request = self.client.get(url);
        self.send_json(request, &format!("GET images/search(query={query})"))
            .await
    }

    /// Registers a user with the legacy local auth (`POST /auth/register`).
    ///
    /// # Errors
    ///
    /// Same as [`ShopClient::list_sweets`]. The backend reports duplicate
    /// emails as a rejection carrying its message.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<RegisteredUser, ClientError> {
        let request = self
            .client
            .post(self.endpoint("auth/register")?)
            .json(&RegisterRequest {
                email,
                password,
                role,
            });
        self.send_json(request, "POST auth/register").await
    }

    /// Resolves `path` against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Attaches the bearer token, if the provider has one. A provider failure
    /// is logged and the request goes out unauthenticated; the backend then
    /// decides what the caller may do.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.token().await {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!(error = %e, "failed to obtain auth token; sending request without it");
                request
            }
        }
    }

    /// Sends the request and turns any non-2xx status into
    /// [`ClientError::Api`]. A 401 also invalidates the cached token.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.authorize(request).await.send().await?;
        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "backend responded");

        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        let rejection = rejection_from_response(response).await;
        tracing::warn!(status = status.as_u16(), error = %rejection, "backend rejected request");
        Err(rejection)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ClientError> {
        let body = self.execute(request).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Builds the multipart body for create/update: a JSON `sweet` part and an
/// optional binary `image` part.
fn sweet_form(draft: SweetDraft, image: Option<ImageUpload>) -> Result<Form, ClientError> {
    let draft = draft.validated()?;
    let json = serde_json::to_string(&draft).map_err(|e| ClientError::Encode {
        context: "encode sweet".to_string(),
        source: e,
    })?;
    let mut form = Form::new().part("sweet", Part::text(json).mime_str("application/json")?);
    if let Some(image) = image {
        form = form.part("image", image.into_part()?);
    }
    Ok(form)
}

/// Parses `base_url`, ensuring it ends with exactly one slash so relative
/// joins append to its path instead of replacing the last segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, ClientError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Converts a non-2xx response into [`ClientError::Api`], reading the
/// backend's message from the body when there is one.
pub(crate) async fn rejection_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => extract_backend_message(&body),
        Err(e) => {
            tracing::debug!(error = %e, "could not read error body");
            None
        }
    };
    ClientError::Api { status, message }
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies: the `message` field, then `error`. Other bodies: the trimmed
/// text itself if it is short and not HTML.
fn extract_backend_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .filter_map(|key| value.get(key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_string);
    }

    if trimmed.starts_with('<') || trimmed.chars().count() > MAX_PLAIN_MESSAGE_CHARS {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
