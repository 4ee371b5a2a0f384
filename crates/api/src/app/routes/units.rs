use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::IntoResponse,
};
use chrono::Utc;

use stockledger_core::PrimaryId;
use stockledger_infra::stock_store::StockQuery;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn secondary_and_model(
    Extension(services): Extension<Arc<AppServices>>,
    Path(primary_id): Path<String>,
) -> axum::response::Response {
    let primary_id = match PrimaryId::parse(&primary_id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.lookup_secondary_and_model(&primary_id).await {
        Ok(found) => Json(found).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Every placement of a unit, newest first. Unknown units yield an empty list.
pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(primary_id): Path<String>,
    Query(q): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let primary_id = match PrimaryId::parse(&primary_id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let as_of = q.as_of.unwrap_or_else(Utc::now);

    match services.ledger.projections().unit_history(&primary_id, as_of).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
