use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use super::auth::SESSION_COOKIE;
use crate::error::AppError;
use crate::state::AppState;

/// Readable cookie holding the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header browser clients echo the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Fresh random token, hex encoded.
pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn tokens_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Whether a request must carry a matching `X-CSRF-Token`.
///
/// Only unsafe requests that rely on the session cookie are checked; bearer-token
/// clients cannot be driven by a third-party page.
pub fn check_request(method: &Method, headers: &HeaderMap) -> Result<(), AppError> {
    if is_safe(method) || headers.contains_key(AUTHORIZATION) {
        return Ok(());
    }
    let jar = CookieJar::from_headers(headers);
    if jar.get(SESSION_COOKIE).is_none() {
        return Ok(());
    }
    let expected = jar.get(CSRF_COOKIE).map(|c| c.value()).unwrap_or_default();
    let supplied = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !expected.is_empty() && tokens_match(expected, supplied) {
        Ok(())
    } else {
        Err(AppError::CsrfFailed)
    }
}

/// Middleware enforcing [`check_request`] when CSRF protection is enabled.
pub async fn enforce_csrf(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.auth.csrf_protection {
        check_request(request.method(), request.headers()).inspect_err(|_| {
            tracing::warn!(method = %request.method(), path = %request.uri().path(), "CSRF check failed");
        })?;
    }
    Ok(next.run(request).await)
}
