use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use stockledger_infra::stock_store::ReferenceStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateNamedRequest>,
) -> axum::response::Response {
    match services.ledger.create_warehouse(&body.name).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger.projections().warehouses().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_model(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateNamedRequest>,
) -> axum::response::Response {
    match services.ledger.create_model(&body.name).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_models(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger.projections().models().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
