use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DocumentId, DocumentTypeId, DomainError, ModelId, PrimaryId, WarehouseId};
use stockledger_inventory::{Document, ReceiveGoods, TRANSFER, TransferStock, Unit};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct GoodsInRequest {
    pub warehouse_id: i64,
    #[serde(default)]
    pub from_warehouse_id: Option<i64>,
    /// Defaults to the time the request is handled.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub goods: Vec<GoodsInLine>,
}

#[derive(Debug, Deserialize)]
pub struct GoodsInLine {
    pub model_id: i64,
    pub primary_id: String,
    pub secondary_id: String,
    pub price: i64,
}

impl GoodsInRequest {
    pub fn into_command(self, now: DateTime<Utc>) -> Result<ReceiveGoods, DomainError> {
        let units = self
            .goods
            .into_iter()
            .map(|line| -> Result<Unit, DomainError> {
                Ok(Unit::new(
                    ModelId::new(line.model_id),
                    PrimaryId::parse(&line.primary_id)?,
                    line.secondary_id,
                    line.price,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReceiveGoods {
            destination: WarehouseId::new(self.warehouse_id),
            source: self.from_warehouse_id.map(WarehouseId::new),
            effective_date: self.date.unwrap_or(now),
            units,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub warehouse_id: i64,
    pub from_warehouse_id: i64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Defaults to the seeded transfer type.
    #[serde(default)]
    pub document_type: Option<i64>,
    pub goods: Vec<MovementLine>,
}

#[derive(Debug, Deserialize)]
pub struct MovementLine {
    pub primary_id: String,
}

impl MovementRequest {
    pub fn into_command(self, now: DateTime<Utc>) -> Result<TransferStock, DomainError> {
        let units = self
            .goods
            .iter()
            .map(|line| PrimaryId::parse(&line.primary_id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransferStock {
            destination: WarehouseId::new(self.warehouse_id),
            source: WarehouseId::new(self.from_warehouse_id),
            effective_date: self.date.unwrap_or(now),
            document_type: self.document_type.map_or(TRANSFER, DocumentTypeId::new),
            units,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNamedRequest {
    pub name: String,
}

// -------------------------
// Query DTOs
// -------------------------

/// Optional reference instant for age calculations (defaults to now).
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AgeWiseQuery {
    pub model: i64,
    pub age: i64,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentDocumentsQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document_id: DocumentId,
    pub document_type_id: DocumentTypeId,
    pub warehouse_id: WarehouseId,
    pub from_warehouse_id: Option<WarehouseId>,
    pub date: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            document_id: doc.id,
            document_type_id: doc.document_type_id,
            warehouse_id: doc.warehouse_id,
            from_warehouse_id: doc.from_warehouse_id,
            date: doc.date,
        }
    }
}
