//! HTTP client for the scraping API.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use retailscope_core::product::{CategoryPayload, ProductPayload};
use retailscope_core::{AppConfig, RetailerConfig};

use crate::error::ClientError;
use crate::types::{Envelope, Scraped};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct ScrapeBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
}

/// Client for the scraping API. One POST per scrape; nothing is retried.
#[derive(Debug, Clone)]
pub struct ScrapeClient {
    client: Client,
    base_url: String,
}

impl ScrapeClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:3333/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an http(s)
    /// URL, or [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// # Errors
    ///
    /// See [`ScrapeClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scrapes one product page: POST `{url}` to the retailer's route.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connectivity`] when the API cannot be reached or times out.
    /// - [`ClientError::Status`] for non-2xx responses.
    /// - [`ClientError::Api`] when the envelope reports failure.
    /// - [`ClientError::Deserialize`] when the body is not a product envelope.
    pub async fn scrape_product(
        &self,
        retailer: &RetailerConfig,
        url: &str,
    ) -> Result<Scraped<ProductPayload>, ClientError> {
        self.make_request(&retailer.route, &ScrapeBody { url, page: None })
            .await
    }

    /// Scrapes a category page: POST `{url}` or `{url, page}` to the
    /// retailer's category route. `page` is only sent to paginated routes and
    /// defaults to 1 there.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedOperation`] without a network call
    /// when the retailer has no category route; otherwise as
    /// [`ScrapeClient::scrape_product`].
    pub async fn scrape_category(
        &self,
        retailer: &RetailerConfig,
        url: &str,
        page: Option<u32>,
    ) -> Result<Scraped<CategoryPayload>, ClientError> {
        let Some(category) = &retailer.category else {
            return Err(ClientError::UnsupportedOperation {
                retailer: retailer.name.clone(),
            });
        };
        let page = category.paginated.then(|| page.unwrap_or(1).max(1));
        self.make_request(&category.route, &ScrapeBody { url, page })
            .await
    }

    async fn make_request<B, T>(&self, route: &str, body: &B) -> Result<Scraped<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(route);
        tracing::debug!(endpoint = %endpoint, "posting scrape request");

        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message = extract_error_message(&text)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), %message, "scrape request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        // `data` is only typed once `success` has been honoured, so a failure
        // envelope with an odd payload still surfaces its message.
        let envelope: Envelope<Value> =
            serde_json::from_str(&text).map_err(|e| ClientError::Deserialize {
                context: format!("response from {endpoint}"),
                source: e,
            })?;
        let scraped = envelope.into_result()?;
        let data = serde_json::from_value(scraped.data).map_err(|e| ClientError::Deserialize {
            context: format!("payload from {endpoint}"),
            source: e,
        })?;
        Ok(Scraped {
            data,
            message: scraped.message,
            saved_to: scraped.saved_to,
            timestamp: scraped.timestamp,
        })
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

fn map_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_connect() || error.is_timeout() {
        ClientError::Connectivity { source: error }
    } else {
        ClientError::Http(error)
    }
}

/// Best-effort message from an error body: `message`, `error`, or
/// `error.message`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.get("message"),
        value.get("error"),
        value.get("error").and_then(|e| e.get("message")),
    ];
    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_owned);
    found
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
