use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_auth::{Identity, IssuedToken, Role, User};
use catalog_core::{DomainError, ProductId, UserId};
use catalog_products::{Product, RemovalOutcome};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            message: "Login successful",
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub role: Role,
}

impl From<&Identity> for MeResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.subject(),
            role: identity.role().clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl From<RemovalOutcome> for RemovalResponse {
    fn from(outcome: RemovalOutcome) -> Self {
        match outcome {
            RemovalOutcome::Decremented { product } => Self {
                message: "Stock count decreased",
                product: Some(product),
            },
            RemovalOutcome::Deleted { .. } => Self {
                message: "Product deleted",
                product: None,
            },
        }
    }
}

// -------------------------
// Helpers
// -------------------------

pub fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse()
}
