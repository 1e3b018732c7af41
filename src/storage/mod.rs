pub mod ledger_store;

pub use ledger_store::{JsonLedgerStore, LedgerStore, MemoryLedgerStore};
