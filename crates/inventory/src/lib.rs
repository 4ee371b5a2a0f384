//! Stock domain module.
//!
//! Units, documents, live and archived placements, the ledger commands, and
//! the transfer validator. Pure, deterministic logic (no IO, no HTTP, no storage).

pub mod command;
pub mod document;
pub mod stock;
pub mod transfer;
pub mod unit;

pub use command::{ReceiveGoods, TransferStock};
pub use document::{Document, GOODS_IN, NewDocument, TRANSFER};
pub use stock::{HistoryEntry, LiveStockEntry, PlacedEntry};
pub use transfer::{TransferPlan, plan_transfer};
pub use unit::Unit;
