use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which authentication collaborator supplies bearer tokens for this
/// deployment. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Tokens are issued by the external identity provider and handed to the
    /// client as-is.
    IdentityProvider,
    /// Legacy email/password login against the backend's `/auth/login`.
    Local,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::IdentityProvider => write!(f, "identity-provider"),
            AuthMode::Local => write!(f, "local"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub api_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub auth_mode: AuthMode,
    pub api_token: Option<String>,
    pub local_email: Option<String>,
    pub local_password: Option<String>,
    pub identity_profile_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_url", &self.api_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("auth_mode", &self.auth_mode)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("local_email", &self.local_email)
            .field(
                "local_password",
                &self.local_password.as_ref().map(|_| "[redacted]"),
            )
            .field("identity_profile_path", &self.identity_profile_path)
            .finish()
    }
}
