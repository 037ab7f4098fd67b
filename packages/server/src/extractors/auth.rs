use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::entity::session;
use crate::entity::user::AccountRole;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Authenticated caller for the duration of one request.
///
/// Built from the `Authorization: Bearer <token>` header or the `session` cookie,
/// and only accepted while the backing session row exists and has not expired.
/// Add it as a handler parameter to require a login.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    pub role: AccountRole,
    pub session_id: Uuid,
}

/// Like [`Principal`], but anonymous or stale sessions yield `None` instead of an error.
pub struct MaybePrincipal(pub Option<Principal>);

/// Locate the session token. A malformed `Authorization` header is an error rather
/// than a fallback to the cookie.
pub fn find_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::TokenInvalid)?;
        return Ok(Some(token.trim().to_string()));
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

/// Verify a token and its session row.
pub async fn resolve_principal(state: &AppState, token: &str) -> Result<Principal, AppError> {
    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    let session = session::Entity::find_by_id(claims.sid)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    if session.user_id != claims.uid || session.expires_at <= Utc::now() {
        return Err(AppError::TokenInvalid);
    }

    Ok(Principal {
        user_id: claims.uid,
        username: claims.sub,
        role: claims.role,
        session_id: session.id,
    })
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = find_token(&parts.headers)?.ok_or(AppError::TokenMissing)?;
        resolve_principal(state, &token).await
    }
}

impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(Some(token)) = find_token(&parts.headers) else {
            return Ok(MaybePrincipal(None));
        };
        match resolve_principal(state, &token).await {
            Ok(principal) => Ok(MaybePrincipal(Some(principal))),
            Err(AppError::TokenInvalid) => Ok(MaybePrincipal(None)),
            Err(e) => Err(e),
        }
    }
}
