//! Registration, login and logout.
//!
//! Both credential modes answer with `{"token": …}`; cookie deployments also
//! open a session and set its cookie.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use services::AuthOutcome;
use tracing::warn;

use crate::web::{cookies, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(form) = payload?;
    let outcome = state.accounts.register(&form.username, &form.password).await?;
    state.metrics.registrations.inc();
    token_response(&state, StatusCode::CREATED, outcome).await
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(form) = payload?;
    let outcome = state.accounts.authorize(&form.username, &form.password).await;
    state.metrics.record_login(outcome.is_ok());
    token_response(&state, StatusCode::OK, outcome?).await
}

/// Ends the cookie session if there is one, then redirects home.
/// Bearer deployments have nothing to revoke.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut response = (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response();

    if let Some(sessions) = state.sessions() {
        if let Some(id) = cookies::session_id(&headers) {
            if let Err(err) = sessions.destroy(&id).await {
                warn!(error = %err, "could not destroy session on logout");
            }
        }
        response.headers_mut().insert(SET_COOKIE, cookies::cleared_cookie());
    }
    response
}

async fn token_response(state: &AppState, status: StatusCode, outcome: AuthOutcome) -> Result<Response, ApiError> {
    let mut response = (status, Json(json!({ "token": outcome.token }))).into_response();

    if let Some(sessions) = state.sessions() {
        let session = sessions.create(&outcome.user).await?;
        let cookie = cookies::session_cookie(&session.id, sessions.ttl())?;
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    Ok(response)
}
