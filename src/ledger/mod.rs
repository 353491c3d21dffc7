mod local;
pub mod models;

pub use local::{LedgerError, LocalLedger};
pub use models::{TransactionRecord, TxStatus};
