pub mod api;
pub mod config;
pub mod eth_rpc;
pub mod explorer;
pub mod ledger;
pub mod metrics;
pub mod reconcile;
pub mod storage;
pub mod wallet;

pub use config::Settings;
pub use ledger::{TransactionRecord, TxStatus};
pub use reconcile::{classify, merge, TransactionService};
