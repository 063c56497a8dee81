use crate::app_config::{AppConfig, Environment, FeatureFlags};
use crate::ConfigError;

/// Demo credentials used when `RETAILSCOPE_DEMO_USERNAME` / `RETAILSCOPE_DEMO_PASSWORD`
/// are absent.
pub const FALLBACK_DEMO_USERNAME: &str = "admin";
pub const FALLBACK_DEMO_PASSWORD: &str = "demo123";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config pointed at `http://localhost:3333/api`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{raw}\""))
            }),
            Err(_) => Ok(default),
        }
    };

    let env = parse_environment(&or_default("RETAILSCOPE_ENV", "development"))?;
    let bind_addr = parse_addr("RETAILSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RETAILSCOPE_LOG_LEVEL", "info");

    let api_base_url = parse_api_base_url(&or_default(
        "RETAILSCOPE_API_BASE_URL",
        "http://localhost:3333/api",
    ))?;

    let retailers_path = PathBuf::from(or_default(
        "RETAILSCOPE_RETAILERS_PATH",
        "./config/retailers.yaml",
    ));

    let username = lookup("RETAILSCOPE_DEMO_USERNAME")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let password = lookup("RETAILSCOPE_DEMO_PASSWORD")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let demo_credentials_defaulted = username.is_none() || password.is_none();
    let demo_username = username.unwrap_or_else(|| FALLBACK_DEMO_USERNAME.to_string());
    let demo_password = password.unwrap_or_else(|| FALLBACK_DEMO_PASSWORD.to_string());

    let request_timeout_secs = parse_u64("RETAILSCOPE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "RETAILSCOPE_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("RETAILSCOPE_USER_AGENT", "retailscope/0.1 (dashboard)");

    let defaults = FeatureFlags::default();
    let features = FeatureFlags {
        category_scraping: parse_flag(
            "RETAILSCOPE_ENABLE_CATEGORY_SCRAPING",
            defaults.category_scraping,
        )?,
        history: parse_flag("RETAILSCOPE_ENABLE_HISTORY", defaults.history)?,
        debug_payload: parse_flag("RETAILSCOPE_ENABLE_DEBUG_PAYLOAD", defaults.debug_payload)?,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_base_url,
        retailers_path,
        demo_username,
        demo_password,
        demo_credentials_defaulted,
        request_timeout_secs,
        user_agent,
        features,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RETAILSCOPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validates the API base URL and strips trailing slashes so routes can be
/// appended as `{base}{route}`.
fn parse_api_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidEnvVar {
        var: "RETAILSCOPE_API_BASE_URL".to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar {
            var: "RETAILSCOPE_API_BASE_URL".to_string(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
