use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// Toggles read from `RETAILSCOPE_ENABLE_*` variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Category (listing page) scraping for retailers that expose a category route.
    pub category_scraping: bool,
    /// Per-panel history of the last few successful scrapes.
    pub history: bool,
    /// Raw JSON payload block under each rendered product.
    pub debug_payload: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            category_scraping: true,
            history: true,
            debug_payload: false,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the scraping API, without a trailing slash.
    pub api_base_url: String,
    pub retailers_path: PathBuf,
    pub demo_username: String,
    pub demo_password: String,
    /// `true` when the demo credentials came from the built-in fallback pair.
    pub demo_credentials_defaulted: bool,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub features: FeatureFlags,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("retailers_path", &self.retailers_path)
            .field("demo_username", &self.demo_username)
            .field("demo_password", &"[redacted]")
            .field(
                "demo_credentials_defaulted",
                &self.demo_credentials_defaulted,
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("features", &self.features)
            .finish()
    }
}
