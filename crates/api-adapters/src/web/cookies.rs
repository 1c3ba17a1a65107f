use std::time::Duration;

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use domains::DomainError;

pub const SESSION_COOKIE: &str = "session_id";

/// Value of the `session_id` cookie, if the request carries a non-empty one.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

pub fn session_cookie(id: &str, ttl: Duration) -> Result<HeaderValue, DomainError> {
    header_value(format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; Max-Age={}",
        ttl.as_secs()
    ))
}

pub fn cleared_cookie() -> HeaderValue {
    HeaderValue::from_static("session_id=; Path=/; HttpOnly; Max-Age=0")
}

fn header_value(raw: String) -> Result<HeaderValue, DomainError> {
    HeaderValue::try_from(raw).map_err(|e| DomainError::Internal(format!("bad cookie header: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session_id=abc123; lang=en"));
        assert_eq!(session_id(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("session_id="));
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn issued_cookie_carries_attributes() {
        let value = session_cookie("abc", Duration::from_secs(1800)).unwrap();
        assert_eq!(value, "session_id=abc; Path=/; HttpOnly; Max-Age=1800");
        assert!(cleared_cookie().to_str().unwrap().ends_with("Max-Age=0"));
    }
}
