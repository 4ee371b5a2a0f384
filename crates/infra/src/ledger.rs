//! Stock ledger service.
//!
//! Entry point for the two mutating operations and the unit lookup. The
//! ledger validates each command shape before touching the store, delegates
//! the transactional work to a [`StockStore`], and folds store and domain
//! failures into one [`LedgerError`].
//!
//! ```text
//! Command
//!   ↓
//! 1. cmd.validate()              (no store access)
//!   ↓
//! 2. store.receive_goods / transfer_stock   (one transaction)
//!   ↓
//! 3. Document with its assigned id
//! ```
//!
//! Read projections are served by the same store through
//! [`StockLedger::projections`].

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use stockledger_core::{DomainError, PrimaryId};
use stockledger_inventory::{Document, ReceiveGoods, TransferStock};

use crate::stock_store::{NamedRef, ReferenceStore, SecondaryAndModel, StockStore, StockStoreError};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed request (missing ids, empty unit list, bad price, unknown reference).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transfer does not match live stock at the source.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("not found")]
    NotFound,

    /// A received unit is already live.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure. Details are logged, never returned to callers.
    #[error("stock store failure")]
    Store(#[source] StockStoreError),
}

impl LedgerError {
    /// Whether the store was reachable but temporarily unable to serve.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LedgerError::Store(StockStoreError::Unavailable(_)))
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                LedgerError::Validation(msg)
            }
            DomainError::InvalidTransfer(msg) => LedgerError::InvalidTransfer(msg),
            DomainError::Conflict(msg) => LedgerError::Conflict(msg),
            DomainError::NotFound => LedgerError::NotFound,
        }
    }
}

impl From<StockStoreError> for LedgerError {
    fn from(value: StockStoreError) -> Self {
        match value {
            StockStoreError::Rejected(domain) => domain.into(),
            StockStoreError::NotFound => LedgerError::NotFound,
            other => LedgerError::Store(other),
        }
    }
}

/// Stock ledger over a transactional store.
#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store, for read projections.
    pub fn projections(&self) -> &S {
        &self.store
    }
}

impl<S> StockLedger<S>
where
    S: StockStore,
{
    /// Record new units arriving at `cmd.destination`.
    ///
    /// Commits one goods-in document and one live entry per unit, or nothing.
    #[instrument(
        skip(self, cmd),
        fields(destination = %cmd.destination, unit_count = cmd.units.len()),
        err
    )]
    pub async fn receive_goods(&self, cmd: ReceiveGoods) -> Result<Document, LedgerError> {
        cmd.validate()?;

        match self.store.receive_goods(&cmd).await {
            Ok(doc) => {
                info!(document_id = %doc.id, "goods received");
                Ok(doc)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Move units between warehouses, archiving their previous placement.
    ///
    /// Every listed unit must be live at `cmd.source`; otherwise nothing is
    /// written and `LedgerError::InvalidTransfer` is returned.
    #[instrument(
        skip(self, cmd),
        fields(
            source = %cmd.source,
            destination = %cmd.destination,
            unit_count = cmd.units.len(),
        ),
        err
    )]
    pub async fn transfer_stock(&self, cmd: TransferStock) -> Result<Document, LedgerError> {
        cmd.validate()?;

        match self.store.transfer_stock(&cmd).await {
            Ok(doc) => {
                info!(document_id = %doc.id, "stock transferred");
                Ok(doc)
            }
            Err(StockStoreError::Rejected(DomainError::InvalidTransfer(msg))) => {
                warn!(reason = %msg, "transfer rejected");
                Err(LedgerError::InvalidTransfer(msg))
            }
            Err(e) => Err(self.report(e)),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn lookup_secondary_and_model(
        &self,
        primary_id: &PrimaryId,
    ) -> Result<SecondaryAndModel, LedgerError> {
        self.store
            .lookup_secondary_and_model(primary_id)
            .await
            .map_err(|e| self.report(e))
    }

    fn report(&self, err: StockStoreError) -> LedgerError {
        if let StockStoreError::Rejected(_) | StockStoreError::NotFound = err {
            return err.into();
        }
        error!(error = %err, "stock store failure");
        err.into()
    }
}

impl<S> StockLedger<S>
where
    S: StockStore + ReferenceStore,
{
    #[instrument(skip(self), err)]
    pub async fn create_warehouse(&self, name: &str) -> Result<NamedRef, LedgerError> {
        let created = self.store.create_warehouse(name).await.map_err(|e| self.report(e))?;
        info!(warehouse_id = created.id, "warehouse created");
        Ok(created)
    }

    #[instrument(skip(self), err)]
    pub async fn create_model(&self, name: &str) -> Result<NamedRef, LedgerError> {
        let created = self.store.create_model(name).await.map_err(|e| self.report(e))?;
        info!(model_id = created.id, "model created");
        Ok(created)
    }
}
