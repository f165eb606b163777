use thiserror::Error;

/// Errors returned by the storefront API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. `message` carries the
    /// backend's own explanation when the body had one.
    #[error("backend rejected request with status {status}{}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The token provider could not produce a token.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A request body could not be encoded.
    #[error("JSON encoding error for {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Local input (a sweet draft, a restock amount) failed validation and
    /// was never sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] sweetshop_core::CoreError),
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ClientError {
    /// Text for a user-facing failure notice: the backend's message when it
    /// sent one, otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(m), ..
            } => m.clone(),
            ClientError::Auth(m) => m.clone(),
            ClientError::InvalidInput(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status of a backend rejection, if that is what this is.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
