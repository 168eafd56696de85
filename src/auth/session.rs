//! Session cookie helpers.
//!
//! Browser clients keep the JWT in an `HttpOnly` cookie so they stay logged
//! in across requests without handling the token themselves.
//!
//! Cookie format: `session=<jwt>; HttpOnly; SameSite=Lax; Path=/; Max-Age=<secs>`

use axum::http::HeaderValue;

/// Cookie name for the session token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Build the `Set-Cookie` header value carrying the session token.
pub fn build_session_cookie(token: &str, max_age_secs: u64) -> anyhow::Result<HeaderValue> {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE_NAME, token, max_age_secs
    );
    Ok(HeaderValue::from_str(&cookie)?)
}

/// Build a `Set-Cookie` header that clears the session cookie.
pub fn build_clear_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Extract the session token from a `Cookie` header value.
pub fn extract_session_token(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    })
}
