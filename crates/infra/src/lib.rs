//! Infrastructure layer: document storage backends and the services that
//! sit between HTTP handlers and the domain crates.

pub mod catalog;
pub mod credentials;
pub mod documents;
pub mod error;
pub mod store;

pub use catalog::CatalogService;
pub use credentials::{AccountService, CredentialStore};
pub use error::ServiceError;
pub use store::{Document, DocumentStore, Filter, StoreError};
pub use store::in_memory::InMemoryDocumentStore;
pub use store::postgres::PostgresDocumentStore;
