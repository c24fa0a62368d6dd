//! Session cookie helpers
//!
//! Builds the `Set-Cookie` values for login and logout and reads the session
//! token back from a request (cookie first, then `Authorization: Bearer`).

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    /// Add the `Secure` attribute
    pub secure: bool,
    pub domain: Option<String>,
}

fn with_attributes(mut cookie: String, settings: &CookieSettings) -> String {
    if let Some(domain) = &settings.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if settings.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(
    settings: &CookieSettings,
    token: &str,
    max_age: chrono::Duration,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.num_seconds().max(0)
    );
    HeaderValue::from_str(&with_attributes(cookie, settings))
}

/// `Set-Cookie` value that expires the session cookie
pub fn clear_session_cookie(
    settings: &CookieSettings,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        SESSION_COOKIE
    );
    HeaderValue::from_str(&with_attributes(cookie, settings))
}

/// Session token from the request, if any
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            domain: Some("example.com".to_string()),
        };
        let cookie = session_cookie(&settings, "abc.def", chrono::Duration::hours(1)).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "token=abc.def; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600; Domain=example.com; Secure"
        );
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = clear_session_cookie(&CookieSettings::default()).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=jwt-value; lang=en"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("jwt-value"));
    }

    #[test]
    fn test_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer jwt-value"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("jwt-value"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
