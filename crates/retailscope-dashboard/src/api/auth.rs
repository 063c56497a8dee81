use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form,
};
use retailscope_core::{Environment, LoginError};
use serde::Deserialize;

use super::AppState;
use crate::boundary::PageError;
use crate::session::{expired_session_cookie, session_cookie, session_id_from_headers};
use crate::views::login::{render_login, LoginView};

#[derive(Debug, Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Fallback credentials are only advertised on a development server.
fn demo_hint(state: &AppState) -> Option<(&str, &str)> {
    (state.config.demo_credentials_defaulted && state.config.is_development()).then(|| {
        (
            state.config.demo_username.as_str(),
            state.config.demo_password.as_str(),
        )
    })
}

pub(super) async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if let Some(id) = session_id_from_headers(&headers) {
        if state.sessions.lookup(&id).await.is_some() {
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    let html = render_login(&LoginView {
        demo_hint: demo_hint(&state),
        ..LoginView::default()
    })?;
    Ok(Html(html).into_response())
}

/// A successful sign-in replaces whatever session the browser still carried.
pub(super) async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.credentials.verify(&form.username, &form.password) {
        Ok(user) => {
            if let Some(previous) = session_id_from_headers(&headers) {
                state.sessions.remove(&previous).await;
            }
            let id = state.sessions.create(user.username.clone()).await;
            tracing::info!(username = %user.username, "signed in");
            let secure = state.config.env == Environment::Production;
            Ok((
                AppendHeaders([(SET_COOKIE, session_cookie(&id, secure))]),
                Redirect::to("/dashboard"),
            )
                .into_response())
        }
        Err(err) => {
            tracing::info!(error = %err, "login rejected");
            let message = err.to_string();
            let mut view = LoginView {
                username: &form.username,
                demo_hint: demo_hint(&state),
                ..LoginView::default()
            };
            let status = match err {
                LoginError::UsernameTooShort => {
                    view.username_error = Some(&message);
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LoginError::PasswordTooShort => {
                    view.password_error = Some(&message);
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                LoginError::InvalidCredentials => {
                    view.message = Some(&message);
                    StatusCode::UNAUTHORIZED
                }
            };
            let html = render_login(&view)?;
            Ok((status, Html(html)).into_response())
        }
    }
}

/// Drops the session with every panel it owns. Works without a session too.
pub(super) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers) {
        if state.sessions.remove(&id).await {
            tracing::info!("signed out");
        }
    }
    (
        AppendHeaders([(SET_COOKIE, expired_session_cookie())]),
        Redirect::to("/login"),
    )
        .into_response()
}
