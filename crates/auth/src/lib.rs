//! `catalog-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes and
//! verifies passwords, issues and verifies session tokens, and decides whether
//! an authenticated identity holds a role.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{Authorized, AuthzError, authorize};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{HashError, PasswordHasher};
pub use principal::Identity;
pub use roles::Role;
pub use token::{DEFAULT_TOKEN_TTL_SECS, IssuedToken, TokenError, TokenService};
pub use user::{NewUser, User};
