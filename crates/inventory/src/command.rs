use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DocumentTypeId, DomainError, PrimaryId, WarehouseId};

use crate::document::{GOODS_IN, NewDocument};
use crate::unit::Unit;

/// Command: ReceiveGoods.
///
/// Places new units into `destination` under a single goods-in document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveGoods {
    pub destination: WarehouseId,
    pub source: Option<WarehouseId>,
    pub effective_date: DateTime<Utc>,
    pub units: Vec<Unit>,
}

/// Command: TransferStock.
///
/// Only primary ids are taken from the caller; every other unit attribute is
/// re-read from the store during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStock {
    pub destination: WarehouseId,
    pub source: WarehouseId,
    pub effective_date: DateTime<Utc>,
    pub document_type: DocumentTypeId,
    pub units: Vec<PrimaryId>,
}

impl ReceiveGoods {
    /// Input checks. Runs before any store access.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.destination.ensure_valid()?;
        if let Some(source) = self.source {
            source.ensure_valid()?;
        }
        if self.units.is_empty() {
            return Err(DomainError::validation("units cannot be empty"));
        }

        let mut seen = HashSet::with_capacity(self.units.len());
        for unit in &self.units {
            unit.validate()?;
            if !seen.insert(&unit.primary_id) {
                return Err(DomainError::validation(format!(
                    "unit {} appears more than once",
                    unit.primary_id
                )));
            }
        }
        Ok(())
    }

    pub fn document(&self) -> NewDocument {
        NewDocument {
            document_type_id: GOODS_IN,
            warehouse_id: self.destination,
            from_warehouse_id: self.source,
            date: self.effective_date,
        }
    }
}

impl TransferStock {
    /// Input checks. Runs before any store access.
    ///
    /// Duplicate primary ids are not rejected here: they surface as an
    /// invalid transfer from the validator, like any other unmatched unit.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.destination.ensure_valid()?;
        self.source.ensure_valid()?;
        self.document_type.ensure_valid()?;
        if self.document_type == GOODS_IN {
            return Err(DomainError::validation(
                "document_type cannot be the goods-in type for a transfer",
            ));
        }
        if self.destination == self.source {
            return Err(DomainError::validation(
                "source and destination warehouse must differ",
            ));
        }
        if self.units.is_empty() {
            return Err(DomainError::validation("units cannot be empty"));
        }
        Ok(())
    }

    pub fn document(&self) -> NewDocument {
        NewDocument {
            document_type_id: self.document_type,
            warehouse_id: self.destination,
            from_warehouse_id: Some(self.source),
            date: self.effective_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_core::ModelId;

    fn pid(s: &str) -> PrimaryId {
        PrimaryId::parse(s).unwrap()
    }

    fn receipt(units: Vec<Unit>) -> ReceiveGoods {
        ReceiveGoods {
            destination: WarehouseId::new(1),
            source: None,
            effective_date: Utc::now(),
            units,
        }
    }

    fn transfer(units: Vec<PrimaryId>) -> TransferStock {
        TransferStock {
            destination: WarehouseId::new(2),
            source: WarehouseId::new(1),
            effective_date: Utc::now(),
            document_type: DocumentTypeId::new(2),
            units,
        }
    }

    #[test]
    fn receipt_requires_units() {
        let err = receipt(vec![]).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn receipt_requires_model() {
        let unit = Unit::new(ModelId::new(0), pid("A1"), "S1", 100);
        assert!(matches!(receipt(vec![unit]).validate(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn receipt_rejects_repeated_primary_id() {
        let a = Unit::new(ModelId::new(5), pid("A1"), "S1", 100);
        let b = Unit::new(ModelId::new(5), pid("A1"), "S2", 100);
        assert!(matches!(receipt(vec![a, b]).validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn receipt_document_is_goods_in() {
        let cmd = receipt(vec![Unit::new(ModelId::new(5), pid("A1"), "S1", 100)]);
        cmd.validate().unwrap();
        let doc = cmd.document();
        assert_eq!(doc.document_type_id, GOODS_IN);
        assert_eq!(doc.warehouse_id, WarehouseId::new(1));
        assert_eq!(doc.from_warehouse_id, None);
    }

    #[test]
    fn transfer_requires_units() {
        assert!(matches!(transfer(vec![]).validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn transfer_rejects_goods_in_type_and_same_warehouse() {
        let mut cmd = transfer(vec![pid("A1")]);
        cmd.document_type = GOODS_IN;
        assert!(cmd.validate().is_err());

        let mut cmd = transfer(vec![pid("A1")]);
        cmd.destination = cmd.source;
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn transfer_document_links_both_warehouses() {
        let cmd = transfer(vec![pid("A1")]);
        let doc = cmd.document();
        assert_eq!(doc.warehouse_id, WarehouseId::new(2));
        assert_eq!(doc.from_warehouse_id, Some(WarehouseId::new(1)));
        assert_eq!(doc.document_type_id, DocumentTypeId::new(2));
    }
}
