//! Credential storage and the account workflows built on it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use catalog_auth::{
    Authorized, AuthzError, IssuedToken, NewUser, PasswordHasher, Role, TokenService, User,
};
use catalog_core::DomainError;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{DocumentStore, Filter, StoreError};

/// Verified against when the username is unknown, so both login failures
/// cost one hash verification.
const DUMMY_PASSWORD: &str = "catalog-login-timing-placeholder";

/// Users keyed by id, looked up by username.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn DocumentStore<User>>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn DocumentStore<User>>) -> Self {
        Self { users }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(&Filter::eq("username", username.trim()))
            .await
    }

    /// Insert a user whose username is not taken yet.
    ///
    /// The uniqueness check and the insert are separate calls: two concurrent
    /// registrations of the same name can both pass the check.
    pub async fn create(&self, user: User) -> ServiceResult<User> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(DomainError::conflict(format!("username '{}' is already taken", user.username)).into());
        }
        Ok(self.users.insert(user).await?)
    }
}

/// Registration, login and admin bootstrap.
#[derive(Clone)]
pub struct AccountService {
    credentials: CredentialStore,
    hasher: PasswordHasher,
    tokens: TokenService,
    dummy_hash: String,
}

impl AccountService {
    pub fn new(credentials: CredentialStore, hasher: PasswordHasher, tokens: TokenService) -> ServiceResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            credentials,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Create a user on behalf of an authorized admin.
    pub async fn register(&self, by: &Authorized, new_user: NewUser) -> ServiceResult<User> {
        if !by.granted().is_admin() {
            return Err(AuthzError::Forbidden {
                required: Role::admin(),
                actual: by.granted().clone(),
            }
            .into());
        }
        new_user.validate()?;

        // Fail fast before paying for a hash.
        if self.credentials.find_by_username(&new_user.username).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "username '{}' is already taken",
                new_user.username.trim()
            ))
            .into());
        }

        let hash = self.hasher.hash(&new_user.password)?;
        let user = self
            .credentials
            .create(User::register(&new_user, hash, Utc::now()))
            .await?;

        info!(
            user_id = %user.id,
            username = %user.username,
            role = %user.role,
            registered_by = %by.identity().subject(),
            "user registered"
        );
        Ok(user)
    }

    /// Check a username/password pair and issue a session token.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<IssuedToken> {
        let Some(user) = self.credentials.find_by_username(username).await? else {
            // Result ignored: only the time spent matters here.
            let _ = self.hasher.verify(password, &self.dummy_hash);
            warn!(username = %username.trim(), "login rejected");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(username = %user.username, "login rejected");
            return Err(ServiceError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id, user.role.clone())?;
        info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok(issued)
    }

    /// Create the initial admin account if the username is still free.
    ///
    /// Returns `true` when a user was created.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> ServiceResult<bool> {
        let new_user = NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role: Some(Role::admin()),
        };
        new_user.validate()?;

        if self.credentials.find_by_username(username).await?.is_some() {
            info!(username = %username.trim(), "bootstrap admin already present");
            return Ok(false);
        }

        let hash = self.hasher.hash(password)?;
        let user = self
            .credentials
            .create(User::register(&new_user, hash, Utc::now()))
            .await?;
        info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
        Ok(true)
    }
}
