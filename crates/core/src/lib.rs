//! `stockledger-core`: shared domain building blocks.
//!
//! Identifiers and the domain error model. No IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, DocumentTypeId, ModelId, PrimaryId, WarehouseId};
