use thiserror::Error;

use catalog_auth::{AuthzError, HashError, TokenError};
use catalog_core::DomainError;

use crate::store::StoreError;

/// Error returned by the application services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unknown username or wrong password; the caller cannot tell which.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("password hashing failed: {0}")]
    Hash(#[from] HashError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
