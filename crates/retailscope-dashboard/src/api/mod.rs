mod auth;
mod dashboard;
mod panels;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use retailscope_client::ScrapeClient;
use retailscope_core::{AppConfig, DemoCredentials, RetailerRegistry};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::boundary::{error_boundary, panic_response};
use crate::middleware::{request_id, require_session, RequestId};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<RetailerRegistry>,
    pub client: ScrapeClient,
    pub sessions: SessionStore,
    pub credentials: DemoCredentials,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<AppConfig>, registry: Arc<RetailerRegistry>, client: ScrapeClient) -> Self {
        let credentials = DemoCredentials::from_config(&config);
        Self {
            config,
            registry,
            client,
            sessions: SessionStore::default(),
            credentials,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    environment: String,
    retailers: usize,
    sessions: usize,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// Wraps page routes in the session gate and the error boundary.
///
/// Outermost first: session check, boundary, panic catcher, handler.
pub(crate) fn guarded(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                state.sessions.clone(),
                require_session,
            ))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                error_boundary,
            ))
            .layer(CatchPanicLayer::custom(panic_response)),
    )
}

fn protected_router(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/dashboard", get(dashboard::show_dashboard))
        .route("/retailers/{slug}", get(panels::show_panel))
        .route("/retailers/{slug}/scrape", post(panels::scrape))
        .route("/retailers/{slug}/retry", post(panels::retry))
        .route("/retailers/{slug}/clear", post(panels::clear))
        .route("/retailers/{slug}/category", post(panels::scrape_category))
        .route(
            "/retailers/{slug}/history/{index}",
            post(panels::restore_history),
        );
    guarded(routes, state)
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                environment: state.config.env.to_string(),
                retailers: state.registry.enabled().count(),
                sessions: state.sessions.len().await,
            },
            meta,
        }),
    )
}
