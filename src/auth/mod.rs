//! Bearer-token authentication module.
//!
//! Tokens are HS256 JWTs carrying the user id and username with a fixed
//! 2-hour expiry, transmitted as `Authorization: Bearer <token>`. The
//! signing secret comes from configuration and falls back to a hardcoded
//! default when unset; startup logs a warning in that case.

use std::sync::Arc;

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Fallback signing secret. A deployment misconfiguration risk, kept for
/// parity with the original contract.
pub const DEFAULT_SECRET: &str = "secret_key";

/// Token lifetime in hours.
pub const TOKEN_EXPIRY_HOURS: i64 = 2;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username at issue time
    pub user_name: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Identity of the authenticated caller, extracted from a verified token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub user_name: String,
}

/// Request extension carrying the (optional) verified identity. Inserted by
/// the middleware for every request so handlers can rely on its presence.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuth(pub Option<AuthContext>);

/// Signs and verifies bearer tokens against the shared secret.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for the given user with the fixed expiry.
    pub fn sign(&self, user_id: &str, user_name: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            user_name: user_name.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token's signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

/// Middleware that decodes the bearer token, if any, and attaches the
/// verified identity to the request. An invalid or expired token leaves the
/// request unauthenticated; resolvers decide what requires auth.
pub async fn bearer_auth_layer(
    tokens: Arc<TokenManager>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let auth = match bearer {
        Some(token) => match tokens.verify(&token) {
            Ok(claims) => Some(AuthContext {
                user_id: claims.sub,
                user_name: claims.user_name,
            }),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(MaybeAuth(auth));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let tokens = TokenManager::new("test-secret");
        let token = tokens.sign("user-1", "gandalf").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.user_name, "gandalf");
        assert!(claims.exp - claims.iat == TOKEN_EXPIRY_HOURS * 3600);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signer = TokenManager::new("secret-a");
        let verifier = TokenManager::new("secret-b");

        let token = signer.sign("user-1", "gandalf").unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let tokens = TokenManager::new("test-secret");
        let now = Utc::now();
        let claims = Claims {
            sub: "user-1".to_string(),
            user_name: "gandalf".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = TokenManager::new("test-secret");
        assert!(tokens.verify("not-a-token").is_err());
    }
}
