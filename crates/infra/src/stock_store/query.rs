//! Read projections over the stock tables.
//!
//! Pure queries reflecting committed state. Nothing here writes. Queries
//! that report ages take an explicit `as_of` instant so that repeated calls
//! return identical results.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DocumentId, ModelId, PrimaryId, WarehouseId};

use super::r#trait::StockStoreError;

/// Default and maximum page size for `recent_documents`.
pub const DEFAULT_RECENT_LIMIT: u32 = 50;
pub const MAX_RECENT_LIMIT: u32 = 1000;

/// A live unit with the document that placed it.
///
/// Returned by `warehouse_stock` and `age_wise`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub document_id: DocumentId,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    /// Whole days between placement and `as_of`.
    pub in_stock_for: i64,
    pub price: i64,
    pub model: String,
    pub date: DateTime<Utc>,
    pub delivery_document_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub document_id: DocumentId,
    pub model: String,
    pub warehouse: String,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    pub price: i64,
    pub warehouse_id: WarehouseId,
}

/// One placement of a unit. `date_out` is `None` for the live placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub document_id: DocumentId,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    pub in_stock_for: i64,
    pub price: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: Option<DateTime<Utc>>,
    pub delivery_document_type: String,
    pub warehouse: String,
    pub warehouse_id: WarehouseId,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: DocumentId,
    pub document_type: String,
    pub date: DateTime<Utc>,
    pub to_warehouse_id: WarehouseId,
    pub to_warehouse: String,
    pub from_warehouse_id: Option<WarehouseId>,
    pub from_warehouse: Option<String>,
}

/// Live unit count grouped by model or warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCount {
    pub id: i64,
    pub name: String,
    pub count: i64,
}

/// Read-only queries over live and archived stock.
///
/// Orderings are part of the contract:
///
/// - `warehouse_stock`, `age_wise`: oldest placement first, then primary id
/// - `search`: model name, then primary id
/// - `unit_history`: `date_in` descending (newest placement first)
/// - `stock_by_*`: name ascending
/// - `recent_documents`: date descending, then id descending
#[async_trait]
pub trait StockQuery: Send + Sync {
    async fn warehouse_stock(
        &self,
        warehouse_id: WarehouseId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError>;

    /// Live units of `model_id` in stock for at least `min_age_days` days.
    async fn age_wise(
        &self,
        model_id: ModelId,
        min_age_days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError>;

    /// Case-insensitive substring match across primary id, secondary id,
    /// model name and warehouse name. A blank token matches every live unit.
    async fn search(&self, token: &str) -> Result<Vec<SearchResultItem>, StockStoreError>;

    async fn unit_history(
        &self,
        primary_id: &PrimaryId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<HistoryItem>, StockStoreError>;

    async fn stock_by_model(&self) -> Result<Vec<StockCount>, StockStoreError>;

    async fn stock_by_warehouse(&self) -> Result<Vec<StockCount>, StockStoreError>;

    async fn recent_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>, StockStoreError>;
}

#[async_trait]
impl<S> StockQuery for Arc<S>
where
    S: StockQuery + ?Sized,
{
    async fn warehouse_stock(
        &self,
        warehouse_id: WarehouseId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        (**self).warehouse_stock(warehouse_id, as_of).await
    }

    async fn age_wise(
        &self,
        model_id: ModelId,
        min_age_days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StockItem>, StockStoreError> {
        (**self).age_wise(model_id, min_age_days, as_of).await
    }

    async fn search(&self, token: &str) -> Result<Vec<SearchResultItem>, StockStoreError> {
        (**self).search(token).await
    }

    async fn unit_history(
        &self,
        primary_id: &PrimaryId,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<HistoryItem>, StockStoreError> {
        (**self).unit_history(primary_id, as_of).await
    }

    async fn stock_by_model(&self) -> Result<Vec<StockCount>, StockStoreError> {
        (**self).stock_by_model().await
    }

    async fn stock_by_warehouse(&self) -> Result<Vec<StockCount>, StockStoreError> {
        (**self).stock_by_warehouse().await
    }

    async fn recent_documents(&self, limit: u32) -> Result<Vec<DocumentSummary>, StockStoreError> {
        (**self).recent_documents(limit).await
    }
}

/// Whole days between `since` and `until` (never negative).
pub(crate) fn days_between(since: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until - since).num_days().max(0)
}

/// Latest placement date old enough for `age_wise`.
///
/// `None` when the cutoff falls outside the representable range, in which case
/// no unit can be that old.
pub(crate) fn age_cutoff(as_of: DateTime<Utc>, min_age_days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(min_age_days.max(0)).and_then(|age| as_of.checked_sub_signed(age))
}

/// Clamp a caller-supplied page size.
pub fn clamp_recent_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_RECENT_LIMIT)
}
