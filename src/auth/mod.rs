//! Bearer JWT actor authentication
//!
//! Every mutating request carries `Authorization: Bearer <token>`; the token's
//! subject is the acting user's id, which is stamped onto ledger entries and
//! `created_by` columns.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// Actor identity extracted by the auth middleware
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    BadSubject,
}

#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    token_ttl_secs: i64,
}

impl AuthService {
    pub fn new(jwt_secret: String, token_ttl_secs: i64) -> Self {
        Self {
            jwt_secret,
            token_ttl_secs,
        }
    }

    /// Issue a JWT for the given user
    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.token_ttl_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Verify a JWT and return the acting user
    pub fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

        let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| AuthError::BadSubject)?;
        Ok(AuthenticatedUser { user_id })
    }
}

/// Axum middleware guarding mutating routes. On success the
/// [`AuthenticatedUser`] is inserted into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;

    // 2. Verify token and inject the actor
    match state.auth.verify_token(token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "token verification failed");
            Err(ApiError::unauthorized("Invalid or expired token"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-secret".to_string(), 3600)
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let token = svc.issue_token(user_id).unwrap();
        let user = svc.verify_token(&token).unwrap();
        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = service().issue_token(Uuid::new_v4()).unwrap();
        let other = AuthService::new("other-secret".to_string(), 3600);
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(service().verify_token("not.a.token").is_err());
    }
}
