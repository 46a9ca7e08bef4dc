use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};

use catalog_auth::NewUser;

use crate::app::dto::{LoginRequest, LoginResponse, RegisterResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::RequireAdmin;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;
    let issued = services.accounts.login(&body.username, &body.password).await?;
    Ok(Json(issued.into()))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    RequireAdmin(admin): RequireAdmin,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(body) = payload?;
    let user = services.accounts.register(&admin, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
            user: user.into(),
        }),
    ))
}
