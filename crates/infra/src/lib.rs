//! Infrastructure layer: stock stores, store configuration, the ledger service.

pub mod config;
pub mod ledger;
pub mod stock_store;

pub use config::{ConfigError, StoreConfig};
pub use ledger::{LedgerError, StockLedger};

#[cfg(test)]
mod integration_tests;
