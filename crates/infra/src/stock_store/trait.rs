use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockledger_core::{DomainError, PrimaryId};
use stockledger_inventory::{Document, ReceiveGoods, TransferStock};

use super::query::StockQuery;
use super::reference::ReferenceStore;

/// Current secondary code and model name of a live unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryAndModel {
    pub secondary_id: String,
    pub model_name: String,
}

/// Stock store operation error.
///
/// `Rejected` carries a deterministic domain decision made inside the
/// transaction (invalid transfer, unit already live, unknown reference).
/// Every other variant is an infrastructure failure; the transaction has
/// been rolled back when any of them is returned.
#[derive(Debug, Error)]
pub enum StockStoreError {
    #[error("rejected: {0}")]
    Rejected(DomainError),

    #[error("no live unit with that primary id")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode row: {0}")]
    Decode(String),
}

impl From<DomainError> for StockStoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => StockStoreError::NotFound,
            other => StockStoreError::Rejected(other),
        }
    }
}

/// Transactional stock store.
///
/// ## Atomicity
///
/// `receive_goods` and `transfer_stock` each run in exactly one store
/// transaction. Either every row they write is committed, or none is.
///
/// ## Transfer isolation
///
/// `transfer_stock` must read the candidate placements inside the same
/// transaction as its writes, and must keep any concurrent transfer from
/// moving the same units until it commits or rolls back (row locks in SQL
/// backends, a held write lock in memory). The decision is made by
/// [`stockledger_inventory::plan_transfer`].
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Insert one goods-in document and one live entry per unit.
    async fn receive_goods(&self, cmd: &ReceiveGoods) -> Result<Document, StockStoreError>;

    /// Validate and relocate units from `cmd.source` to `cmd.destination`.
    async fn transfer_stock(&self, cmd: &TransferStock) -> Result<Document, StockStoreError>;

    /// Secondary code and model name of a live unit.
    async fn lookup_secondary_and_model(
        &self,
        primary_id: &PrimaryId,
    ) -> Result<SecondaryAndModel, StockStoreError>;
}

#[async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn receive_goods(&self, cmd: &ReceiveGoods) -> Result<Document, StockStoreError> {
        (**self).receive_goods(cmd).await
    }

    async fn transfer_stock(&self, cmd: &TransferStock) -> Result<Document, StockStoreError> {
        (**self).transfer_stock(cmd).await
    }

    async fn lookup_secondary_and_model(
        &self,
        primary_id: &PrimaryId,
    ) -> Result<SecondaryAndModel, StockStoreError> {
        (**self).lookup_secondary_and_model(primary_id).await
    }
}

/// A store that serves the ledger, its read projections and reference data.
///
/// Lets callers hold one `Arc<dyn StockBackend>` regardless of backend.
pub trait StockBackend: StockStore + StockQuery + ReferenceStore {}

impl<T> StockBackend for T where T: StockStore + StockQuery + ReferenceStore {}
