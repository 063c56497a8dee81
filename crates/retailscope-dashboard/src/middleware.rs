use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::session::{session_id_from_headers, SessionStore};

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Redirects to the login page unless the request carries a live session
/// cookie. Inserts the [`crate::session::CurrentSession`] for handlers.
pub async fn require_session(
    State(sessions): State<SessionStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let current = match session_id_from_headers(req.headers()) {
        Some(id) => sessions.lookup(&id).await,
        None => None,
    };

    match current {
        Some(current) => {
            req.extensions_mut().insert(current);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "no session; redirecting to login");
            Redirect::to("/login").into_response()
        }
    }
}
