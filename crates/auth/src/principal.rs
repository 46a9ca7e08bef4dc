use catalog_core::UserId;

use crate::{Role, SessionClaims};

/// Identity of an authenticated caller.
///
/// There is no public constructor: the only way to obtain an `Identity` is to
/// verify a session token through [`crate::TokenService::verify`]. Code that
/// requires an `Identity` therefore cannot run without authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: UserId,
    role: Role,
}

impl Identity {
    pub(crate) fn from_claims(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }

    pub fn subject(&self) -> UserId {
        self.subject
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
