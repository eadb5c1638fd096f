//! Authentication port.

/// Claims carried by a bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// Who the token was issued to (an editor's login or email).
    pub subject: String,
    /// Permission names, e.g. `news.add_post`.
    pub permissions: Vec<String>,
}

/// Token service trait for JWT operations.
pub trait TokenService: Send + Sync {
    /// Issue a token for `subject` with the given permissions.
    fn generate_token(&self, subject: &str, permissions: Vec<String>) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
