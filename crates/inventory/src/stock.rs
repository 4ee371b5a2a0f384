use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DocumentId, ModelId, PrimaryId, WarehouseId};

use crate::unit::Unit;

/// Live placement (`main_stock` row): this unit is currently located via this document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStockEntry {
    pub document_id: DocumentId,
    pub model_id: ModelId,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    pub price: i64,
}

impl LiveStockEntry {
    pub fn place(document_id: DocumentId, unit: Unit) -> Self {
        Self {
            document_id,
            model_id: unit.model_id,
            primary_id: unit.primary_id,
            secondary_id: unit.secondary_id,
            price: unit.price,
        }
    }

    pub fn unit(&self) -> Unit {
        Unit {
            model_id: self.model_id,
            primary_id: self.primary_id.clone(),
            secondary_id: self.secondary_id.clone(),
            price: self.price,
        }
    }
}

/// Archived placement (`stock_history` row). Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Document that originally placed the unit.
    pub document_id: DocumentId,
    pub model_id: ModelId,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    pub price: i64,
    pub date_in: DateTime<Utc>,
    pub date_out: DateTime<Utc>,
}

/// A live entry joined with the document that placed it.
///
/// This is what the store hands the transfer validator: the authoritative
/// attributes of the unit plus where and since when it has been located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEntry {
    pub entry: LiveStockEntry,
    pub warehouse_id: WarehouseId,
    pub date_in: DateTime<Utc>,
}

impl PlacedEntry {
    pub fn archive(&self, date_out: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            document_id: self.entry.document_id,
            model_id: self.entry.model_id,
            primary_id: self.entry.primary_id.clone(),
            secondary_id: self.entry.secondary_id.clone(),
            price: self.entry.price,
            date_in: self.date_in,
            date_out,
        }
    }
}
