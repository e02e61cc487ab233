/*!
 * JWT authentication for the API.
 *
 * Access tokens are HS256 JWTs carrying the owning user's id in `sub`.
 * Passwords are hashed with Argon2id. Handlers receive the calling user
 * through the [`AuthenticatedUser`] extractor, which rejects requests
 * without a valid `Authorization: Bearer` token.
 */

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use async_trait::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user's id
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Token signing configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_lifetime: Duration,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            token_lifetime: Duration::from_secs(cfg.jwt_expiration),
        }
    }
}

/// Issues and validates access tokens, and hashes credentials.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn token_lifetime_secs(&self) -> u64 {
        self.config.token_lifetime.as_secs()
    }

    /// Hashes a password with Argon2id and a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, ServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verifies a candidate password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| ServiceError::InternalError(format!("Stored hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Issues a signed access token for the given user.
    pub fn generate_token(&self, user_id: i32) -> Result<String, ServiceError> {
        let now = Utc::now();
        let lifetime = ChronoDuration::from_std(self.config.token_lifetime)
            .map_err(|_| ServiceError::InternalError("Invalid token lifetime".to_string()))?;
        let expires_at = now + lifetime;

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("Token creation failed: {}", e)))
    }

    /// Decodes and validates an access token, returning its claims.
    pub fn decode_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ServiceError::Unauthorized("Token has expired".to_string())
                }
                _ => ServiceError::Unauthorized("Invalid authentication token".to_string()),
            }
        })?;

        Ok(data.claims)
    }

    /// Resolves a bearer token to the owning user's id.
    pub fn authenticate(&self, token: &str) -> Result<i32, ServiceError> {
        let claims = self.decode_token(token)?;
        claims
            .sub
            .parse::<i32>()
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// The calling user, extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = Arc::<AuthService>::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))?;

        let user_id = auth_service.authenticate(token)?;
        Ok(AuthenticatedUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret".to_string(),
            jwt_issuer: "stockpilot-api".to_string(),
            jwt_audience: "stockpilot-clients".to_string(),
            token_lifetime: Duration::from_secs(3600),
        })
    }

    #[test]
    fn token_round_trips_user_id() {
        let svc = service();
        let token = svc.generate_token(42).unwrap();
        assert_eq!(svc.authenticate(&token).unwrap(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let svc = service();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "a-completely-different-secret-value".to_string(),
            jwt_issuer: "stockpilot-api".to_string(),
            jwt_audience: "stockpilot-clients".to_string(),
            token_lifetime: Duration::from_secs(3600),
        });
        let token = other.generate_token(7).unwrap();
        assert!(matches!(
            svc.authenticate(&token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let svc = service();
        let hash = svc.hash_password("hunter2hunter2").unwrap();
        assert!(svc.verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!svc.verify_password("wrong-password", &hash).unwrap());
    }
}
