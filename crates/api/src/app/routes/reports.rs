//! Read-only stock reports.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;

use stockledger_core::{ModelId, WarehouseId};
use stockledger_infra::stock_store::{StockQuery, StockStoreError, query::clamp_recent_limit};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

fn respond<T: Serialize>(result: Result<T, StockStoreError>) -> axum::response::Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn warehouse_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<i64>,
    Query(q): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let warehouse_id = match WarehouseId::new(id).ensure_valid() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let as_of = q.as_of.unwrap_or_else(Utc::now);
    respond(services.ledger.projections().warehouse_stock(warehouse_id, as_of).await)
}

/// `GET /agewise?model=&age=`: live units of a model held for at least `age` days.
pub async fn age_wise(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<dto::AgeWiseQuery>,
) -> axum::response::Response {
    let model_id = match ModelId::new(q.model).ensure_valid() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let as_of = q.as_of.unwrap_or_else(Utc::now);
    respond(services.ledger.projections().age_wise(model_id, q.age, as_of).await)
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<dto::SearchQuery>,
) -> axum::response::Response {
    respond(services.ledger.projections().search(&q.search).await)
}

pub async fn stock_by_model(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond(services.ledger.projections().stock_by_model().await)
}

pub async fn stock_by_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    respond(services.ledger.projections().stock_by_warehouse().await)
}

pub async fn recent_documents(
    Extension(services): Extension<Arc<AppServices>>,
    Query(q): Query<dto::RecentDocumentsQuery>,
) -> axum::response::Response {
    let limit = clamp_recent_limit(q.limit);
    respond(services.ledger.projections().recent_documents(limit).await)
}
