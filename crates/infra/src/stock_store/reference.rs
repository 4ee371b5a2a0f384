//! Warehouses and models that stock documents refer to.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockledger_core::DomainError;

use super::r#trait::StockStoreError;

/// An `(id, name)` row of a reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Trimmed, non-blank reference name.
pub fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name must not be blank"));
    }
    Ok(name.to_string())
}

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn create_warehouse(&self, name: &str) -> Result<NamedRef, StockStoreError>;

    async fn create_model(&self, name: &str) -> Result<NamedRef, StockStoreError>;

    /// All warehouses, ordered by name.
    async fn warehouses(&self) -> Result<Vec<NamedRef>, StockStoreError>;

    /// All models, ordered by name.
    async fn models(&self) -> Result<Vec<NamedRef>, StockStoreError>;
}

#[async_trait]
impl<S> ReferenceStore for Arc<S>
where
    S: ReferenceStore + ?Sized,
{
    async fn create_warehouse(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        (**self).create_warehouse(name).await
    }

    async fn create_model(&self, name: &str) -> Result<NamedRef, StockStoreError> {
        (**self).create_model(name).await
    }

    async fn warehouses(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        (**self).warehouses().await
    }

    async fn models(&self) -> Result<Vec<NamedRef>, StockStoreError> {
        (**self).models().await
    }
}
