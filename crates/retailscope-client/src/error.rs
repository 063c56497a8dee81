use thiserror::Error;

pub const CONNECTIVITY_MESSAGE: &str = "Unable to connect to the scraping server. \
Please check your connection and make sure the server is running.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure or timeout.
    #[error("{CONNECTIVITY_MESSAGE}")]
    Connectivity {
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response. `message` is taken from the body when it carries one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response whose envelope reports `success: false`.
    #[error("{message}")]
    Api { message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("{retailer} does not support category scraping")]
    UnsupportedOperation { retailer: String },
}

impl ClientError {
    /// Text suitable for showing next to the scrape form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Deserialize { .. } => {
                "The scraping server returned a response that could not be read".to_string()
            }
            ClientError::Http(e) => format!("Request failed: {e}"),
            other => other.to_string(),
        }
    }
}
