use thiserror::Error;

use crate::{Identity, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{required}' required, caller has '{actual}'")]
    Forbidden { required: Role, actual: Role },
}

/// Proof that an authenticated identity holds a required role.
///
/// Only [`authorize`] creates this value, and it only accepts an [`Identity`],
/// so holding an `Authorized` implies both gates have passed. Operations that
/// are restricted to a role take it as a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    identity: Identity,
    granted: Role,
}

impl Authorized {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn granted(&self) -> &Role {
        &self.granted
    }
}

/// Authorize an authenticated identity for a required role.
///
/// - No IO
/// - No panics
/// - Exact role match (roles are not hierarchical)
pub fn authorize(identity: &Identity, required: &Role) -> Result<Authorized, AuthzError> {
    if identity.role() != required {
        return Err(AuthzError::Forbidden {
            required: required.clone(),
            actual: identity.role().clone(),
        });
    }

    Ok(Authorized {
        identity: identity.clone(),
        granted: required.clone(),
    })
}
