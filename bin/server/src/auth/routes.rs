//! Authentication routes for login, logout and session-gated pages.

use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use cawi_portal_access::{Language, LoginError};
use cawi_portal_core::SessionHandle;
use serde::Deserialize;
use serde_json::json;

use super::{AppState, SessionContext, SourceAddr};
use crate::pages;

/// Header carrying the anti-forgery token for non-form clients.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Submitted login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    uac: String,
    #[serde(rename = "_csrf", default)]
    csrf: Option<String>,
}

/// Anti-forgery token supplied in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CsrfQuery {
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

/// Display language requested in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    lang: Option<String>,
}

/// Renders the shared "not authenticated" response: the login form with a
/// 401 status and an optional message.
fn not_authenticated(
    state: &AppState,
    handle: &SessionHandle,
    message: Option<String>,
    language: Language,
) -> Response {
    let page = pages::login(
        state.csrf.issue_token(handle),
        state.authenticator.uac_kind().code_length(),
        message,
        language.code(),
    );
    (StatusCode::UNAUTHORIZED, Html(page)).into_response()
}

/// Applies a `?lang=` choice to the session and returns the language to render in.
async fn choose_language(
    state: &AppState,
    handle: &SessionHandle,
    requested: Option<&str>,
) -> Language {
    let Some(language) = requested.and_then(|code| code.parse::<Language>().ok()) else {
        return state.authenticator.language(handle).await;
    };
    if let Err(e) = state.authenticator.set_language(handle, language).await {
        tracing::warn!(error = %e, session = %handle, "failed to save language choice");
    }
    language
}

/// Shows the login form, or sends an authenticated respondent to their survey.
pub async fn login_page(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<LanguageQuery>,
) -> Response {
    let SessionContext { handle, jar } = session;
    let language = choose_language(&state, &handle, query.lang.as_deref()).await;

    if let Some(claims) = state.authenticator.has_session(&handle).await {
        let target = format!("/{}/", claims.case().instrument_name());
        return (jar, Redirect::temporary(&target)).into_response();
    }

    let page = pages::login(
        state.csrf.issue_token(&handle),
        state.authenticator.uac_kind().code_length(),
        None,
        language.code(),
    );
    (jar, Html(page)).into_response()
}

/// Exchanges a submitted access code for an authenticated session.
pub async fn login_submit(
    State(state): State<AppState>,
    session: SessionContext,
    source: SourceAddr,
    headers: HeaderMap,
    Query(query): Query<CsrfQuery>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let SessionContext { handle, jar } = session;

    // A missing or unreadable body still goes through the CSRF check.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "login submitted without a readable form");
            LoginForm::default()
        }
    };

    let supplied = form.csrf.or(query.csrf).or_else(|| {
        headers
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    let trusted = supplied.is_some_and(|token| state.csrf.verify(&handle, &token));
    if !trusted {
        tracing::info!(source_ip = %source, "CSRF mismatch");
        return (
            jar,
            (StatusCode::FORBIDDEN, Html(pages::request_rejected())),
        )
            .into_response();
    }

    match state.authenticator.login(&handle, &form.uac).await {
        Ok(identity) => {
            let target = format!("/{}/", identity.instrument_name());
            (jar, (StatusCode::FOUND, [(header::LOCATION, target)])).into_response()
        }
        Err(e) => {
            let language = state.authenticator.language(&handle).await;
            (jar, login_failure(&state, &handle, &e, language)).into_response()
        }
    }
}

fn login_failure(
    state: &AppState,
    handle: &SessionHandle,
    error: &LoginError,
    language: Language,
) -> Response {
    if error.is_internal() {
        tracing::error!(error = %error, session = %handle, "login failed");
    }
    not_authenticated(state, handle, Some(error.user_message()), language)
}

/// Signs the respondent out.
///
/// The confirmation is shown even if the session could not be cleared.
pub async fn logout(State(state): State<AppState>, session: SessionContext) -> Response {
    let SessionContext { handle, jar } = session;

    if let Err(e) = state.authenticator.logout(&handle).await {
        tracing::warn!(error = %e, session = %handle, "failed to clear session on logout");
    }

    (jar, Html(pages::logout())).into_response()
}

/// Reports whether the caller currently holds a valid session.
pub async fn session_status(State(state): State<AppState>, session: SessionContext) -> Response {
    let status = if state.authenticator.has_session(&session.handle).await.is_some() {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (session.jar, status).into_response()
}

/// Landing page for an instrument, gated on a session for that instrument.
pub async fn instrument_home(
    State(state): State<AppState>,
    session: SessionContext,
    Path(instrument_name): Path<String>,
) -> Response {
    let SessionContext { handle, jar } = session;

    let claims = match state.authenticator.has_session(&handle).await {
        Some(claims) if claims.authenticated_for_instrument(&instrument_name) => {
            return (jar, Json(json!({ "authenticated": true }))).into_response();
        }
        claims => claims,
    };
    if let Some(claims) = claims {
        tracing::info!(
            requested = %instrument_name,
            authenticated_for = claims.case().instrument_name(),
            "session is for another instrument"
        );
    }

    let language = state.authenticator.language(&handle).await;
    (jar, not_authenticated(&state, &handle, None, language)).into_response()
}

/// Explains that the session has expired.
pub async fn timed_out() -> Html<String> {
    Html(pages::timed_out())
}

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "healthy": true }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}
