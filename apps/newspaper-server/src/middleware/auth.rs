//! Authentication and permission extractors.
//!
//! Requests without an `Authorization` header run as an anonymous caller and
//! are turned away with 403 by [`Authorized`]. A header that is present but
//! carries a bad or expired token is rejected with 401.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::marker::PhantomData;

use newspaper_core::domain::{Caller, POST_EDITOR, Permission};
use newspaper_core::ports::{AuthError, TokenClaims};

use super::error::AppError;
use crate::state::AppState;

/// The caller behind a request.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Token subject, `None` for anonymous requests.
    pub subject: Option<String>,
    pub caller: Caller,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            subject: None,
            caller: Caller::anonymous(),
        }
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        let caller = Caller::from_names(claims.permissions.iter().map(String::as_str));
        Self {
            subject: Some(claims.subject),
            caller,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => {
                AppError::Unauthorized("Your authentication token has expired.".to_string())
            }
            AuthError::InvalidToken(msg) => AppError::Unauthorized(msg),
        }
    }
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(Identity::anonymous());
    };

    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::InvalidToken("Server configuration error".to_string())
    })?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    // Parse "Bearer <token>"
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    Ok(Identity::from(state.tokens.validate_token(token)?))
}

/// A set of permissions a route demands up front.
pub trait Capability {
    const REQUIRED: &'static [Permission];
}

/// Publish, edit and delete posts.
pub struct PostEditor;

impl Capability for PostEditor {
    const REQUIRED: &'static [Permission] = &POST_EDITOR;
}

/// Create categories.
pub struct CategoryEditor;

impl Capability for CategoryEditor {
    const REQUIRED: &'static [Permission] = &[Permission::AddCategory];
}

/// An identity holding every permission of `C`.
///
/// Handlers list it ahead of their body extractor, so a caller lacking a
/// permission gets 403 before the body is read.
pub struct Authorized<C: Capability> {
    pub identity: Identity,
    _capability: PhantomData<C>,
}

impl<C: Capability> Authorized<C> {
    pub fn caller(&self) -> &Caller {
        &self.identity.caller
    }
}

impl<C: Capability> FromRequest for Authorized<C> {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let authorized = identify(req).map_err(AppError::from).and_then(|identity| {
            identity.caller.require(C::REQUIRED)?;
            tracing::debug!(subject = ?identity.subject, "Request authorized");
            Ok(Authorized {
                identity,
                _capability: PhantomData,
            })
        });
        ready(authorized)
    }
}
