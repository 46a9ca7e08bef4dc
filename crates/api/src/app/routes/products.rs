use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
};

use catalog_products::{Product, ProductDraft};

use crate::app::dto::{self, RemovalResponse, SearchQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::RequireAdmin;

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.catalog.list_products().await?))
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let q = query.q.unwrap_or_default();
    Ok(Json(services.catalog.search_products(&q).await?))
}

pub async fn low_stock_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.catalog.low_stock_products().await?))
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    Ok(Json(services.catalog.get_product(id).await?))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    RequireAdmin(_admin): RequireAdmin,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(draft) = payload?;
    let product = services.catalog.create_product(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let Json(draft) = payload?;
    Ok(Json(services.catalog.update_product(id, draft).await?))
}

/// Remove one unit; the product is deleted when its last unit goes.
pub async fn remove_product(
    Extension(services): Extension<Arc<AppServices>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<RemovalResponse>, ApiError> {
    let id = dto::parse_product_id(&id)?;
    let outcome = services.catalog.remove_product(id).await?;
    Ok(Json(outcome.into()))
}
