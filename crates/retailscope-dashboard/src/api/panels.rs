//! Scrape panel handlers.
//!
//! Every mutation is a form POST answered with a redirect back to the panel.
//! The session lock is taken twice per scrape (start, then complete) and is
//! never held while the scraping API is called.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::{Duration, Utc};
use retailscope_core::panel::Ticket;
use retailscope_core::{
    DisplayState, PanelError, PanelState, RetailerConfig, ScrapeOutcome, ScrapeRequest,
};
use serde::Deserialize;

use super::AppState;
use crate::boundary::PageError;
use crate::session::CurrentSession;
use crate::views::panel::{render_panel, PanelView};

/// Extra time past the request timeout before a loading panel is treated as
/// abandoned.
const STALE_GRACE_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
pub(super) struct DisplayQuery {
    img: Option<String>,
    expand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UrlForm {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryForm {
    #[serde(default)]
    url: String,
    page: Option<String>,
}

fn find_retailer<'a>(state: &'a AppState, slug: &str) -> Result<&'a RetailerConfig, PageError> {
    state
        .registry
        .get(slug)
        .filter(|retailer| retailer.enabled)
        .ok_or_else(|| PageError::NotFound(format!("No retailer named \"{slug}\".")))
}

fn stale_after(state: &AppState) -> Duration {
    i64::try_from(state.config.request_timeout_secs.saturating_add(STALE_GRACE_SECS))
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn panel_redirect(slug: &str) -> Response {
    Redirect::to(&format!("/retailers/{slug}")).into_response()
}

fn start(
    panel: &mut PanelState,
    retailer: &RetailerConfig,
    request: ScrapeRequest,
    stale_after: Duration,
) -> Result<(Ticket, ScrapeRequest), PanelError> {
    let ticket = panel.begin(retailer, request, Utc::now(), stale_after)?;
    let request = panel.last_request.clone().ok_or(PanelError::NothingToRetry)?;
    Ok((ticket, request))
}

async fn execute(
    state: &AppState,
    retailer: &RetailerConfig,
    request: &ScrapeRequest,
) -> Result<ScrapeOutcome, String> {
    let result = match request {
        ScrapeRequest::Product { url } => {
            state
                .client
                .scrape_product(retailer, url)
                .await
                .map(|scraped| {
                    tracing::info!(
                        retailer = %retailer.slug,
                        saved_to = scraped.saved_to.as_deref().unwrap_or(""),
                        "product scraped"
                    );
                    ScrapeOutcome::Product(scraped.data)
                })
        }
        ScrapeRequest::Category { url, page } => state
            .client
            .scrape_category(retailer, url, *page)
            .await
            .map(|scraped| {
                tracing::info!(
                    retailer = %retailer.slug,
                    products = scraped.data.products.len(),
                    "category scraped"
                );
                ScrapeOutcome::Category(scraped.data)
            }),
    };
    result.map_err(|err| {
        tracing::warn!(retailer = %retailer.slug, error = %err, "scrape failed");
        err.user_message()
    })
}

/// Starts a request with `begin`, calls the API without the lock, then
/// applies the result unless a newer request or a clear superseded it.
async fn run(
    state: &AppState,
    user: &CurrentSession,
    retailer: &RetailerConfig,
    begin: impl FnOnce(&mut PanelState) -> Result<(Ticket, ScrapeRequest), PanelError>,
) -> Response {
    let Some(started) = state
        .sessions
        .with_panel(&user.id, &retailer.slug, begin)
        .await
    else {
        return Redirect::to("/login").into_response();
    };

    let (ticket, request) = match started {
        Ok(started) => started,
        Err(err) => {
            tracing::info!(retailer = %retailer.slug, error = %err, "scrape request not sent");
            return panel_redirect(&retailer.slug);
        }
    };

    let result = execute(state, retailer, &request).await;
    let record_history = state.config.features.history;
    let applied = state
        .sessions
        .with_panel(&user.id, &retailer.slug, |panel| {
            panel.complete(ticket, result, record_history, Utc::now())
        })
        .await;
    if applied == Some(false) {
        tracing::debug!(retailer = %retailer.slug, "discarded superseded response");
    }

    panel_redirect(&retailer.slug)
}

pub(super) async fn show_panel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path(slug): Path<String>,
    Query(query): Query<DisplayQuery>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    let Some(panel) = state.sessions.panel_snapshot(&user.id, &slug).await else {
        return Ok(Redirect::to("/login").into_response());
    };

    let image = query.img.as_deref().and_then(|raw| raw.trim().parse().ok());
    let display_state = DisplayState::from_query(image, query.expand.as_deref());
    let html = render_panel(&PanelView {
        retailer,
        panel: &panel,
        state: &display_state,
        features: &state.config.features,
        user: &user,
    })?;
    Ok(Html(html).into_response())
}

pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path(slug): Path<String>,
    Form(form): Form<UrlForm>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    let stale = stale_after(&state);
    let request = ScrapeRequest::Product { url: form.url };
    Ok(run(&state, &user, retailer, |panel| start(panel, retailer, request, stale)).await)
}

pub(super) async fn scrape_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path(slug): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    if !state.config.features.category_scraping || !retailer.supports_category() {
        return Err(PageError::NotFound(format!(
            "{} does not support category pages.",
            retailer.name
        )));
    }
    let stale = stale_after(&state);
    let page = form.page.as_deref().and_then(|raw| raw.trim().parse().ok());
    let request = ScrapeRequest::Category {
        url: form.url,
        page,
    };
    Ok(run(&state, &user, retailer, |panel| start(panel, retailer, request, stale)).await)
}

pub(super) async fn retry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    let stale = stale_after(&state);
    Ok(run(&state, &user, retailer, |panel| {
        panel.retry(retailer, Utc::now(), stale)
    })
    .await)
}

pub(super) async fn clear(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    state
        .sessions
        .with_panel(&user.id, &retailer.slug, PanelState::clear)
        .await;
    Ok(panel_redirect(&retailer.slug))
}

pub(super) async fn restore_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
    Path((slug, index)): Path<(String, usize)>,
) -> Result<Response, PageError> {
    let retailer = find_retailer(&state, &slug)?;
    if !state.config.features.history {
        return Err(PageError::NotFound("History is disabled.".to_string()));
    }
    let restored = state
        .sessions
        .with_panel(&user.id, &retailer.slug, |panel| panel.restore(index))
        .await;
    match restored {
        Some(Err(err)) => Err(PageError::NotFound(err.to_string())),
        Some(Ok(())) | None => Ok(panel_redirect(&retailer.slug)),
    }
}
