use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DocumentId, DocumentTypeId, WarehouseId};

/// Document type of an initial receipt into a warehouse.
pub const GOODS_IN: DocumentTypeId = DocumentTypeId::new(1);

/// Document type seeded for warehouse-to-warehouse transfers.
pub const TRANSFER: DocumentTypeId = DocumentTypeId::new(2);

/// Immutable record of a stock-affecting event (receipt or transfer).
///
/// Written exactly once per ledger operation; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub document_type_id: DocumentTypeId,
    /// Destination warehouse.
    pub warehouse_id: WarehouseId,
    /// Source warehouse; `None` for an initial goods-in.
    pub from_warehouse_id: Option<WarehouseId>,
    pub date: DateTime<Utc>,
}

/// A document that has been decided but not yet assigned an id by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub document_type_id: DocumentTypeId,
    pub warehouse_id: WarehouseId,
    pub from_warehouse_id: Option<WarehouseId>,
    pub date: DateTime<Utc>,
}

impl NewDocument {
    pub fn with_id(self, id: DocumentId) -> Document {
        Document {
            id,
            document_type_id: self.document_type_id,
            warehouse_id: self.warehouse_id,
            from_warehouse_id: self.from_warehouse_id,
            date: self.date,
        }
    }
}
