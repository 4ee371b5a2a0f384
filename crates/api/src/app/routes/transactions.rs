use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /transactions/goodsin`: record a receipt into a warehouse.
pub async fn goods_in(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::GoodsInRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command(Utc::now()) {
        Ok(cmd) => cmd,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.receive_goods(cmd).await {
        Ok(doc) => (StatusCode::CREATED, Json(dto::DocumentResponse::from(doc))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// `POST /transactions/movement`: move live units between warehouses.
pub async fn movement(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command(Utc::now()) {
        Ok(cmd) => cmd,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.transfer_stock(cmd).await {
        Ok(doc) => (StatusCode::CREATED, Json(dto::DocumentResponse::from(doc))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
