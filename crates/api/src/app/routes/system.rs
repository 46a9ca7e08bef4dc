use axum::{Json, http::StatusCode};

use crate::app::dto::MeResponse;
use crate::authz::Authenticated;

pub async fn root() -> &'static str {
    "Product Catalog API"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn me(Authenticated(identity): Authenticated) -> Json<MeResponse> {
    Json(MeResponse::from(&identity))
}
