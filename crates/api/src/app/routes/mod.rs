use axum::{
    Router,
    routing::{get, post},
};

pub mod reference;
pub mod reports;
pub mod system;
pub mod transactions;
pub mod units;

/// Router for every ledger endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/transactions/goodsin", post(transactions::goods_in))
        .route("/transactions/movement", post(transactions::movement))
        .route("/units/:primary_id", get(units::secondary_and_model))
        .route("/units/:primary_id/history", get(units::history))
        .route(
            "/warehouses",
            get(reference::list_warehouses).post(reference::create_warehouse),
        )
        .route("/warehouses/:id/stock", get(reports::warehouse_stock))
        .route(
            "/models",
            get(reference::list_models).post(reference::create_model),
        )
        .route("/agewise", get(reports::age_wise))
        .route("/search", get(reports::search))
        .route("/stock/by-model", get(reports::stock_by_model))
        .route("/stock/by-warehouse", get(reports::stock_by_warehouse))
        .route("/documents/recent", get(reports::recent_documents))
}
