//! Access-token issuing and validation (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::services::auth::Role;

/// JWT service for token generation and validation.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_minutes: i64,
}

/// Claims of an access token. The optional workspace claim locks client
/// tokens to their tenant; admin tokens carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (account identifier)
    pub sub: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiry_minutes: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            expiry_minutes,
        }
    }

    /// Issue a token; returns it with its lifetime in seconds.
    pub fn issue(
        &self,
        sub: &str,
        role: Role,
        workspace_id: Option<i64>,
    ) -> Result<(String, i64), AppError> {
        let now = Utc::now();
        let expires_in = Duration::minutes(self.expiry_minutes);
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            role,
            workspace_id,
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok((token, expires_in.num_seconds()))
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<AccessTokenClaims, AppError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(&SecretString::new("test-secret".to_string()), 60)
    }

    #[test]
    fn round_trip_preserves_claims() {
        let jwt = service();
        let (token, expires_in) = jwt.issue("client-1", Role::Client, Some(3)).unwrap();
        assert_eq!(expires_in, 3600);

        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, "client-1");
        assert_eq!(claims.role, Role::Client);
        assert_eq!(claims.workspace_id, Some(3));
    }

    #[test]
    fn admin_token_has_no_workspace_claim() {
        let jwt = service();
        let (token, _) = jwt.issue("admin-1", Role::Admin, None).unwrap();
        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.workspace_id, None);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let jwt = service();
        assert!(jwt.validate("not-a-token").is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let jwt = service();
        let other = JwtService::new(&SecretString::new("other-secret".to_string()), 60);
        let (token, _) = other.issue("admin-1", Role::Admin, None).unwrap();
        assert!(jwt.validate(&token).is_err());
    }
}
