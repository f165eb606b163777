use crate::app_config::{AppConfig, AuthMode, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without touching `set_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("SWEETSHOP_ENV", "development"))?;
    let api_url = parse_api_url(&or_default("SWEETSHOP_API_URL", "http://localhost:8080/api"))?;
    let log_level = or_default("SWEETSHOP_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("SWEETSHOP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SWEETSHOP_USER_AGENT", "sweetshop/0.1 (storefront-client)");
    let auth_mode = parse_auth_mode(&or_default("SWEETSHOP_AUTH_MODE", "identity-provider"))?;
    let api_token = optional("SWEETSHOP_API_TOKEN");
    let identity_profile_path = optional("SWEETSHOP_IDENTITY_PROFILE").map(PathBuf::from);

    let (local_email, local_password) = match auth_mode {
        AuthMode::Local => (
            Some(require("SWEETSHOP_LOCAL_EMAIL")?),
            Some(require("SWEETSHOP_LOCAL_PASSWORD")?),
        ),
        AuthMode::IdentityProvider => (None, None),
    };

    Ok(AppConfig {
        env,
        api_url,
        log_level,
        request_timeout_secs,
        user_agent,
        auth_mode,
        api_token,
        local_email,
        local_password,
        identity_profile_path,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SWEETSHOP_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

fn parse_auth_mode(s: &str) -> Result<AuthMode, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "identity-provider" | "idp" => Ok(AuthMode::IdentityProvider),
        "local" => Ok(AuthMode::Local),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SWEETSHOP_AUTH_MODE".to_string(),
            reason: format!("expected identity-provider or local; got {other:?}"),
        }),
    }
}

/// Only the scheme is checked here; the client re-parses the URL when it is
/// constructed.
fn parse_api_url(s: &str) -> Result<String, ConfigError> {
    let trimmed = s.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "SWEETSHOP_API_URL".to_string(),
            reason: format!("expected an http(s) URL; got {trimmed:?}"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
