// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::models::Role;
use crate::time_utils::token_window;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decode and verify a token signed with `signing_key`.
pub fn decode_jwt(token: &str, signing_key: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::InvalidToken
        })
}

/// Middleware that requires valid JWT authentication.
///
/// The user is re-read on every request so that bans and role changes apply
/// immediately instead of at token expiry.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;
    let claims = decode_jwt(token, &state.config.jwt_signing_key)?;

    let user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    if user.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }

    let auth_user = AuthUser {
        user_id: user.id,
        role: user.role,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Create an access token for a user session.
pub fn create_jwt(
    user_id: &str,
    role: Role,
    signing_key: &[u8],
    expire_minutes: i64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let (iat, exp) = token_window(chrono::Utc::now(), expire_minutes)?;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        iat,
        exp,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_jwt_roundtrip_carries_role() {
        let token = create_jwt("user-1", Role::Admin, KEY, 30).unwrap();
        let claims = decode_jwt(&token, KEY).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = create_jwt("user-1", Role::User, KEY, 30).unwrap();
        let err = decode_jwt(&token, b"another_key_that_is_32_bytes!!!!").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: "user-1".to_string(),
            role: Role::User,
            iat: 1_000_000,
            exp: 1_000_060,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        assert!(matches!(
            decode_jwt(&token, KEY),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_require_admin() {
        let user = AuthUser {
            user_id: "u".to_string(),
            role: Role::User,
        };
        assert!(matches!(user.require_admin(), Err(AppError::Forbidden(_))));

        let admin = AuthUser {
            user_id: "a".to_string(),
            role: Role::Admin,
        };
        assert!(admin.require_admin().is_ok());
    }
}
