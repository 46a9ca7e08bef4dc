use axum::{
    Router,
    routing::{get, post, put},
};

pub mod categories;
pub mod products;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/api/users/login", post(users::login))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/products", get(products::list_products))
        .route("/api/products/search", get(products::search_products))
        .route("/api/products/low-stock", get(products::low_stock_products))
        .route("/api/products/:id", get(products::get_product))
}

/// Endpoints that require a verified bearer token. Admin-only handlers
/// additionally take the `RequireAdmin` extractor.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/users/me", get(system::me))
        .route("/api/users/register", post(users::register))
        .route("/api/categories", post(categories::create_category))
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/:id",
            put(products::update_product).delete(products::remove_product),
        )
}
