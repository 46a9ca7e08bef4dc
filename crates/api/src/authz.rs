//! Request extractors that turn the authenticated identity into handler
//! arguments.
//!
//! Both read the `Identity` placed in the request extensions by
//! [`crate::middleware::auth_middleware`]. When the middleware is not mounted
//! on a route they answer 401 instead of failing the request with a 500.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use catalog_auth::{Authorized, Identity, Role, authorize};

use crate::app::errors::ApiError;

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// An authenticated caller holding the `admin` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Authorized);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Authenticated)
            .ok_or(ApiError::Unauthenticated)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        Ok(RequireAdmin(authorize(&identity, &Role::admin())?))
    }
}
