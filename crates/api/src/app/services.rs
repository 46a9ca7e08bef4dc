//! Service wiring: storage backend selection and the application services
//! shared by all handlers.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use catalog_auth::{PasswordHasher, TokenService, User};
use catalog_infra::{
    AccountService, CatalogService, CredentialStore, DocumentStore, InMemoryDocumentStore, PostgresDocumentStore,
    ServiceError,
};
use catalog_products::{Category, Product};

use crate::config::ApiConfig;

const MAX_DB_CONNECTIONS: u32 = 10;

pub struct AppServices {
    pub accounts: AccountService,
    pub catalog: CatalogService,
}

struct Stores {
    users: Arc<dyn DocumentStore<User>>,
    categories: Arc<dyn DocumentStore<Category>>,
    products: Arc<dyn DocumentStore<Product>>,
}

impl AppServices {
    fn from_stores(stores: Stores, hasher: PasswordHasher, tokens: TokenService) -> Result<Self, ServiceError> {
        let accounts = AccountService::new(CredentialStore::new(stores.users), hasher, tokens)?;
        let catalog = CatalogService::new(stores.products, stores.categories);
        Ok(Self { accounts, catalog })
    }

    /// Services over fresh in-memory stores.
    pub fn in_memory(hasher: PasswordHasher, tokens: TokenService) -> Result<Self, ServiceError> {
        let stores = Stores {
            users: Arc::new(InMemoryDocumentStore::<User>::new()),
            categories: Arc::new(InMemoryDocumentStore::<Category>::new()),
            products: Arc::new(InMemoryDocumentStore::<Product>::new()),
        };
        Self::from_stores(stores, hasher, tokens)
    }

    /// Services over a Postgres pool. The `documents` table is created if missing.
    pub async fn postgres(pool: sqlx::PgPool, hasher: PasswordHasher, tokens: TokenService) -> anyhow::Result<Self> {
        catalog_infra::store::postgres::migrate(&pool)
            .await
            .context("failed to create documents table")?;

        let pool = Arc::new(pool);
        let stores = Stores {
            users: Arc::new(PostgresDocumentStore::<User>::from_shared(pool.clone())),
            categories: Arc::new(PostgresDocumentStore::<Category>::from_shared(pool.clone())),
            products: Arc::new(PostgresDocumentStore::<Product>::from_shared(pool)),
        };
        Ok(Self::from_stores(stores, hasher, tokens)?)
    }
}

/// Build the services described by `config` and create the bootstrap admin.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl).context("invalid token configuration")?;
    let hasher = PasswordHasher::new();

    let services = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url.expose_secret())
                .await
                .context("failed to connect to database")?;
            info!("using postgres document store");
            AppServices::postgres(pool, hasher, tokens).await?
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            AppServices::in_memory(hasher, tokens)?
        }
    };

    if let Some(admin) = &config.admin {
        services
            .accounts
            .bootstrap_admin(&admin.username, admin.password.expose_secret())
            .await
            .context("failed to create bootstrap admin")?;
    }

    Ok(services)
}
