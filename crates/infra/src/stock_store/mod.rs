//! Transactional stock store boundary.
//!
//! The only writer of `document`, `main_stock` and `stock_history`. Each
//! ledger operation runs inside one store transaction; the transfer decision
//! itself is delegated to the pure validator in `stockledger-inventory`.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod reference;
pub mod r#trait;

pub use in_memory::InMemoryStockStore;
pub use postgres::PostgresStockStore;
pub use query::{
    DocumentSummary, HistoryItem, SearchResultItem, StockCount, StockItem, StockQuery,
};
pub use reference::{NamedRef, ReferenceStore};
pub use r#trait::{SecondaryAndModel, StockBackend, StockStore, StockStoreError};
