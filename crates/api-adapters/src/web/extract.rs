use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use domains::{DomainError, Principal};

use super::{cookies, ApiError, AppState, Credentials};

/// The authenticated caller, resolved from whichever credential the
/// deployment accepts. Handlers that take this reject anonymous requests.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match &state.credentials {
            Credentials::Bearer => {
                let token = bearer_token(&parts.headers)
                    .ok_or_else(|| DomainError::Unauthorized("missing bearer token".into()))?;
                Ok(CurrentUser(state.accounts.verify_token(token)?))
            }
            Credentials::Cookie(sessions) => {
                let id = cookies::session_id(&parts.headers);
                let session = sessions.check(id.as_deref()).await?;
                Ok(CurrentUser(session.principal()))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
