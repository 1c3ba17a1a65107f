//! # Middleware
//!
//! Request tracing, panic recovery, CORS and the sliding cookie session.

use std::any::Any;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, SET_COOKIE},
        Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, warn};

use super::{cookies, AppState};

/// One span per request: method, uri, status and latency.
pub fn standard_middleware() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Turns a panicking handler into a 500 with the usual JSON error body.
pub fn panic_recovery() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "internal server error" })),
    )
        .into_response()
}

pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Pushes a live cookie session's expiry forward on every request that
/// carries one, whatever the handler's outcome, and re-issues the cookie.
/// Handlers that already set a cookie (login, register, logout) are left
/// alone. A failed slide is only logged.
pub async fn slide_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(sessions) = state.sessions().cloned() else {
        return next.run(request).await;
    };
    let session_id = cookies::session_id(request.headers());

    let mut response = next.run(request).await;

    let Some(id) = session_id else {
        return response;
    };
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    match sessions.touch(&id).await {
        Ok(true) => match cookies::session_cookie(&id, sessions.ttl()) {
            Ok(cookie) => {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            Err(err) => warn!(error = %err, "could not re-issue session cookie"),
        },
        Ok(false) => debug!("session expired before it could slide"),
        Err(err) => warn!(error = %err, "session slide failed"),
    }
    response
}
