use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::user::AccountRole;

/// Session token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,       // Username
    pub uid: i32,          // User ID
    pub role: AccountRole, // Linked profile kind
    pub sid: Uuid,         // Session row ID
    pub exp: usize,        // Expiration timestamp
}

/// Sign a session token that expires together with its session row.
pub fn sign(
    user_id: i32,
    username: &str,
    role: AccountRole,
    session_id: Uuid,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String> {
    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role,
        sid: session_id,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a session token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
