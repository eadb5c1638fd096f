//! JWT token service implementation.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use newspaper_core::ports::{AuthError, TokenClaims, TokenService};

const DEV_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "newspaper".to_string(),
        }
    }
}

impl JwtConfig {
    /// Load from `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);

        if secret == DEV_SECRET {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        Self {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    perms: Vec<String>,
    exp: i64,
    iat: i64,
    iss: String,
}

/// JWT-based token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, subject: &str, permissions: Vec<String>) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: subject.to_string(),
            perms: permissions,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(TokenClaims {
            subject: data.claims.sub,
            permissions: data.claims.perms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(issuer: &str) -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_permissions_survive_round_trip() {
        let service = service("test-issuer");
        let perms = vec!["news.add_post".to_string(), "news.change_post".to_string()];

        let token = service.generate_token("editor@paper.example", perms.clone()).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.subject, "editor@paper.example");
        assert_eq!(claims.permissions, perms);
    }

    #[test]
    fn test_validate_invalid_token() {
        let result = service("test-issuer").validate_token("invalid-token");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let token = service("issuer1").generate_token("reader", vec![]).unwrap();
        assert!(service("issuer2").validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: -1,
            ..JwtConfig::default()
        });
        let token = service.generate_token("editor", vec![]).unwrap();
        assert!(matches!(service.validate_token(&token), Err(AuthError::TokenExpired)));
    }
}
