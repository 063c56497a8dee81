pub mod app_config;
pub mod auth;
pub mod config;
pub mod display;
pub mod format;
pub mod panel;
pub mod product;
pub mod retailers;
pub mod sanitize;
pub mod text;
pub mod url_rule;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, FeatureFlags};
pub use auth::{AuthenticatedUser, DemoCredentials, LoginError};
pub use config::{load_app_config, load_app_config_from_env};
pub use display::{build_product_view, DisplayConfig, DisplayState, ProductView};
pub use panel::{PanelError, PanelState, ScrapeOutcome, ScrapeRequest, HISTORY_LIMIT};
pub use product::{CategoryPayload, ProductPayload};
pub use retailers::{load_retailers, RetailerConfig, RetailerGroup, RetailerRegistry};
pub use url_rule::{UrlRule, UrlRuleError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file at {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[source] serde_yaml::Error),

    #[error("retailers validation error: {0}")]
    Validation(String),
}
