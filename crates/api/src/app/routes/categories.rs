use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};

use catalog_products::{Category, NewCategory};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::RequireAdmin;

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(services.catalog.list_categories().await?))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    RequireAdmin(_admin): RequireAdmin,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(body) = payload?;
    let category = services.catalog.create_category(body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
