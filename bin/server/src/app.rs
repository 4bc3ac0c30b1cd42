//! HTTP routing for the portal.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::auth::{AppState, routes};
use crate::headers::with_security_headers;

/// Builds the full application router.
pub fn router(state: AppState, dev_mode: bool) -> Router {
    let router = Router::new()
        .route("/", get(routes::login_page))
        .route("/login", get(routes::login_page).post(routes::login_submit))
        .route("/logout", get(routes::logout))
        .route("/session-status", get(routes::session_status))
        .route("/timed-out", get(routes::timed_out))
        .route("/health", get(routes::health))
        .route("/{instrument_name}/", get(routes::instrument_home))
        .fallback(routes::not_found)
        .with_state(state);

    with_security_headers(router, dev_mode).layer(TraceLayer::new_for_http())
}
