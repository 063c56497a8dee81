use serde::{Deserialize, Serialize};

use retailscope_core::panel::FALLBACK_FAILURE_MESSAGE;

use crate::error::ClientError;

/// Response wrapper every scraping-API route returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    /// Where the API persisted the scrape, when it did.
    pub saved_to: Option<String>,
    pub timestamp: Option<String>,
}

/// Payload of a successful envelope plus its bookkeeping fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Scraped<T> {
    pub data: T,
    pub message: Option<String>,
    pub saved_to: Option<String>,
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] when `success` is false or `data` is
    /// missing, carrying the envelope message or a generic fallback.
    pub fn into_result(self) -> Result<Scraped<T>, ClientError> {
        let failure = |message: Option<String>| ClientError::Api {
            message: message
                .map(|m| m.trim().to_owned())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
        };

        if !self.success {
            return Err(failure(self.message));
        }
        match self.data {
            Some(data) => Ok(Scraped {
                data,
                message: self.message,
                saved_to: self.saved_to,
                timestamp: self.timestamp,
            }),
            None => Err(failure(self.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn envelope(value: Value) -> Envelope<Value> {
        serde_json::from_value(value).expect("valid envelope")
    }

    #[test]
    fn success_with_data_is_ok() {
        let scraped = envelope(json!({
            "success": true,
            "data": {"title": "x"},
            "savedTo": "output/amazon.json",
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .into_result()
        .unwrap();
        assert_eq!(scraped.data, json!({"title": "x"}));
        assert_eq!(scraped.saved_to.as_deref(), Some("output/amazon.json"));
        assert_eq!(scraped.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn failure_carries_server_message() {
        let err = envelope(json!({"success": false, "message": "Product not found"}))
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let err = envelope(json!({"success": false})).into_result().unwrap_err();
        assert_eq!(err.to_string(), FALLBACK_FAILURE_MESSAGE);
    }

    #[test]
    fn success_without_data_is_a_failure() {
        let err = envelope(json!({"success": true, "message": " "}))
            .into_result()
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { .. }));
        assert_eq!(err.to_string(), FALLBACK_FAILURE_MESSAGE);
    }

    #[test]
    fn missing_success_counts_as_failure() {
        assert!(envelope(json!({"data": {}})).into_result().is_err());
    }
}
