//! Error boundary for every page behind the session gate.
//!
//! Handler panics are turned into a marked response by [`panic_response`]
//! (installed through `CatchPanicLayer`); handler render failures become the
//! same marked response through [`PageError`]. [`error_boundary`] swaps any
//! marked response for the error page.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Request, State};
use axum::http::{header::USER_AGENT, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::api::AppState;
use crate::session::CurrentSession;
use crate::views::error::{render_error_page, render_not_found, ErrorPage};

static ERROR_SEQ: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static LAST_PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Returns a new id of the form `ERR-<unix millis>-<sequence>`. The sequence
/// makes ids distinct for the process lifetime even within one millisecond.
#[must_use]
pub fn next_error_id() -> String {
    let seq = ERROR_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    format!("ERR-{}-{seq}", Utc::now().timestamp_millis())
}

/// Response extension asking [`error_boundary`] to render the error page.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    pub message: String,
    pub details: Option<String>,
}

impl RenderFailure {
    fn into_marked_response(self) -> Response {
        let mut response =
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Failures a page handler can return.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to render page")]
    Render(#[from] fmt::Error),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::Render(err) => RenderFailure {
                message: "The page could not be rendered.".to_string(),
                details: Some(err.to_string()),
            }
            .into_marked_response(),
            Self::NotFound(what) => match render_not_found(&what) {
                Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                Err(_) => (StatusCode::NOT_FOUND, what).into_response(),
            },
        }
    }
}

/// Records where the last panic on this thread happened, then defers to the
/// previously installed hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(location) = info.location() {
            let location = format!("{}:{}:{}", location.file(), location.line(), location.column());
            LAST_PANIC_LOCATION.with(|slot| *slot.borrow_mut() = Some(location));
        }
        previous(info);
    }));
}

/// Response factory for `CatchPanicLayer::custom`.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let panic_message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    let location = LAST_PANIC_LOCATION.with(|slot| slot.borrow_mut().take());
    let details = match location {
        Some(location) => format!("panicked at {location}: {panic_message}"),
        None => format!("panicked: {panic_message}"),
    };
    RenderFailure {
        message: "An unexpected error occurred while handling this request.".to_string(),
        details: Some(details),
    }
    .into_marked_response()
}

/// The report offered to the operator through "Copy Error Report".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_id: String,
    pub message: String,
    pub details: Option<String>,
    pub url: String,
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Where "Try Again" points: the page without UI-state query. Form posts
/// fall back to the page that submitted them.
fn recovery_path(method: &Method, path: &str) -> String {
    if method == Method::GET {
        return path.to_owned();
    }
    let mut segments = path.trim_start_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some("retailers"), Some(slug)) if !slug.is_empty() => format!("/retailers/{slug}"),
        _ => "/dashboard".to_owned(),
    }
}

/// Replaces marked failure responses with the error page.
pub async fn error_boundary(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let full_url = req
        .uri()
        .path_and_query()
        .map_or_else(|| path.clone(), ToString::to_string);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    let user = req.extensions().get::<CurrentSession>().cloned();

    let response = next.run(req).await;
    let Some(failure) = response.extensions().get::<RenderFailure>().cloned() else {
        return response;
    };

    let development = state.config.is_development();
    let error_id = next_error_id();
    tracing::error!(
        error_id = %error_id,
        method = %method,
        path = %path,
        details = failure.details.as_deref().unwrap_or(""),
        "request failed inside error boundary"
    );

    let try_again = recovery_path(&method, &path);
    let reload = if method == Method::GET {
        full_url.clone()
    } else {
        try_again.clone()
    };
    let report = ErrorReport {
        error_id,
        message: failure.message,
        details: if development { failure.details } else { None },
        url: if development { full_url } else { path },
        user_agent,
        timestamp: Utc::now(),
    };

    let page = ErrorPage {
        report: &report,
        try_again_href: &try_again,
        reload_href: &reload,
        show_details: development,
        user: user.as_ref(),
    };
    match render_error_page(&page) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong. Error ID: {}", report.error_id),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn error_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| next_error_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.starts_with("ERR-")));
    }

    #[test]
    fn panic_payloads_are_reported() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let failure = response.extensions().get::<RenderFailure>().unwrap();
        assert!(failure.details.as_deref().unwrap().contains("boom"));

        let response = panic_response(Box::new(String::from("owned boom")));
        let failure = response.extensions().get::<RenderFailure>().unwrap();
        assert!(failure.details.as_deref().unwrap().contains("owned boom"));
    }

    #[test]
    fn render_errors_are_marked_for_the_boundary() {
        let response = PageError::Render(fmt::Error).into_response();
        assert!(response.extensions().get::<RenderFailure>().is_some());
    }

    #[test]
    fn not_found_is_not_marked() {
        let response = PageError::NotFound("Unknown retailer".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<RenderFailure>().is_none());
    }

    #[test]
    fn recovery_path_for_form_posts() {
        assert_eq!(recovery_path(&Method::GET, "/retailers/amazon"), "/retailers/amazon");
        assert_eq!(
            recovery_path(&Method::POST, "/retailers/amazon/scrape"),
            "/retailers/amazon"
        );
        assert_eq!(recovery_path(&Method::POST, "/logout"), "/dashboard");
    }
}
