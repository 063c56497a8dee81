//! Per-retailer scrape panel state.
//!
//! A panel is a small state machine: `begin` validates input and hands out a
//! [`Ticket`]; the caller performs the request without holding any lock and
//! reports back through `complete`. Tickets older than the panel's latest
//! request are discarded, so a slow response never overwrites newer state.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::product::{CategoryPayload, ProductPayload};
use crate::retailers::RetailerConfig;
use crate::url_rule::UrlRuleError;

/// Most-recent scrapes kept per panel.
pub const HISTORY_LIMIT: usize = 5;

pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to scrape product";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeRequest {
    Product { url: String },
    Category { url: String, page: Option<u32> },
}

impl ScrapeRequest {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            ScrapeRequest::Product { url } | ScrapeRequest::Category { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Product(ProductPayload),
    Category(CategoryPayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
    pub product: ProductPayload,
}

/// Bounded list of recent scrapes, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryRing {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryRing {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("Please enter a product URL")]
    EmptyUrl,

    #[error("Please enter a category URL")]
    EmptyCategoryUrl,

    #[error("Please enter a valid {retailer} URL ({reason})")]
    InvalidUrl { retailer: String, reason: String },

    #[error("A request is already in progress")]
    Busy,

    #[error("{retailer} does not support category scraping")]
    CategoryUnsupported { retailer: String },

    #[error("There is no previous request to retry")]
    NothingToRetry,

    #[error("History entry {0} does not exist")]
    HistoryOutOfRange(usize),
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    pub url: String,
    pub category_url: String,
    pub page: Option<u32>,
    pub is_loading: bool,
    pub loading_started: Option<DateTime<Utc>>,
    pub product: Option<ProductPayload>,
    pub category: Option<CategoryPayload>,
    pub error: Option<String>,
    pub history: HistoryRing,
    pub last_request: Option<ScrapeRequest>,
    seq: u64,
}

impl PanelState {
    /// Validates `request` against the retailer's rules and marks the panel
    /// loading.
    ///
    /// A panel that has been loading for longer than `stale_after` is treated
    /// as abandoned and accepts a new request.
    ///
    /// # Errors
    ///
    /// Returns a [`PanelError`] without touching result state when the input
    /// is rejected or another request is in flight. Validation failures are
    /// also stored in `error` for display.
    pub fn begin(
        &mut self,
        retailer: &RetailerConfig,
        request: ScrapeRequest,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<Ticket, PanelError> {
        if self.is_loading
            && self
                .loading_started
                .is_some_and(|started| now - started < stale_after)
        {
            return Err(PanelError::Busy);
        }

        let request = match self.validate(retailer, request) {
            Ok(request) => request,
            Err(err) => {
                if !matches!(err, PanelError::CategoryUnsupported { .. }) {
                    self.error = Some(err.to_string());
                }
                return Err(err);
            }
        };

        if let ScrapeRequest::Category { page, .. } = &request {
            self.page = *page;
        }

        self.seq += 1;
        self.is_loading = true;
        self.loading_started = Some(now);
        self.product = None;
        self.category = None;
        self.error = None;
        self.last_request = Some(request);

        Ok(Ticket { seq: self.seq })
    }

    fn validate(
        &mut self,
        retailer: &RetailerConfig,
        request: ScrapeRequest,
    ) -> Result<ScrapeRequest, PanelError> {
        let invalid = |err: UrlRuleError| PanelError::InvalidUrl {
            retailer: retailer.name.clone(),
            reason: err.to_string(),
        };

        match request {
            ScrapeRequest::Product { url } => {
                let trimmed = url.trim().to_owned();
                self.url.clone_from(&trimmed);
                if trimmed.is_empty() {
                    return Err(PanelError::EmptyUrl);
                }
                retailer.url_rule.check(&trimmed).map_err(invalid)?;
                Ok(ScrapeRequest::Product { url: trimmed })
            }
            ScrapeRequest::Category { url, page } => {
                let Some(category) = &retailer.category else {
                    return Err(PanelError::CategoryUnsupported {
                        retailer: retailer.name.clone(),
                    });
                };
                let trimmed = url.trim().to_owned();
                self.category_url.clone_from(&trimmed);
                if trimmed.is_empty() {
                    return Err(PanelError::EmptyCategoryUrl);
                }
                category.url_rule.check(&trimmed).map_err(invalid)?;
                let page = if category.paginated {
                    Some(page.unwrap_or(1).max(1))
                } else {
                    None
                };
                Ok(ScrapeRequest::Category { url: trimmed, page })
            }
        }
    }

    /// Applies the result of the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the panel untouched when `ticket` is stale.
    /// Product successes are prepended to history when `record_history` is set.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<ScrapeOutcome, String>,
        record_history: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if ticket.seq != self.seq {
            return false;
        }

        self.is_loading = false;
        self.loading_started = None;

        match result {
            Ok(ScrapeOutcome::Product(product)) => {
                if record_history {
                    let url = self
                        .last_request
                        .as_ref()
                        .map_or_else(|| self.url.clone(), |r| r.url().to_owned());
                    self.history.push(HistoryEntry {
                        url,
                        title: product
                            .title()
                            .unwrap_or_else(|| "Untitled product".to_string()),
                        scraped_at: now,
                        product: product.clone(),
                    });
                }
                self.product = Some(product);
                self.error = None;
            }
            Ok(ScrapeOutcome::Category(category)) => {
                self.category = Some(category);
                self.error = None;
            }
            Err(message) => {
                let message = message.trim();
                self.error = Some(if message.is_empty() {
                    FALLBACK_FAILURE_MESSAGE.to_string()
                } else {
                    message.to_string()
                });
            }
        }
        true
    }

    /// Re-issues the last request.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::NothingToRetry`] when no request has been made
    /// since the last clear, or any error [`PanelState::begin`] returns.
    pub fn retry(
        &mut self,
        retailer: &RetailerConfig,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<(Ticket, ScrapeRequest), PanelError> {
        let request = self.last_request.clone().ok_or(PanelError::NothingToRetry)?;
        let ticket = self.begin(retailer, request, now, stale_after)?;
        let request = self.last_request.clone().ok_or(PanelError::NothingToRetry)?;
        Ok((ticket, request))
    }

    /// Resets input, result and error. History is kept; any in-flight
    /// response is discarded when it arrives.
    pub fn clear(&mut self) {
        self.seq += 1;
        self.url.clear();
        self.category_url.clear();
        self.page = None;
        self.is_loading = false;
        self.loading_started = None;
        self.product = None;
        self.category = None;
        self.error = None;
        self.last_request = None;
    }

    /// Makes a history entry current again without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::HistoryOutOfRange`] for an unknown index.
    pub fn restore(&mut self, index: usize) -> Result<(), PanelError> {
        let entry = self
            .history
            .get(index)
            .cloned()
            .ok_or(PanelError::HistoryOutOfRange(index))?;
        self.seq += 1;
        self.is_loading = false;
        self.loading_started = None;
        self.last_request = Some(ScrapeRequest::Product {
            url: entry.url.clone(),
        });
        self.url = entry.url;
        self.product = Some(entry.product);
        self.category = None;
        self.error = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
