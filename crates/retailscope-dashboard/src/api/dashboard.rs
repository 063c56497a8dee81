use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Extension,
};

use super::AppState;
use crate::boundary::PageError;
use crate::session::CurrentSession;
use crate::views::dashboard::render_dashboard;

pub(super) async fn show_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentSession>,
) -> Result<Response, PageError> {
    let active = state.sessions.active_panels(&user.id).await;
    let html = render_dashboard(&state.registry, &user, &active)?;
    Ok(Html(html).into_response())
}
