use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, ModelId, PrimaryId};

/// A physical item of stock.
///
/// `primary_id` identifies the unit while it is live; `secondary_id` is a
/// supplementary code with no uniqueness guarantee. `price` is an integer
/// monetary amount in the store's currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub model_id: ModelId,
    pub primary_id: PrimaryId,
    pub secondary_id: String,
    pub price: i64,
}

impl Unit {
    pub fn new(
        model_id: ModelId,
        primary_id: PrimaryId,
        secondary_id: impl Into<String>,
        price: i64,
    ) -> Self {
        Self {
            model_id,
            primary_id,
            secondary_id: secondary_id.into(),
            price,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        self.model_id.ensure_valid()?;
        if self.price < 0 {
            return Err(DomainError::validation(format!(
                "unit {}: price cannot be negative",
                self.primary_id
            )));
        }
        Ok(())
    }
}
