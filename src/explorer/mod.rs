//! Remote transaction history from a block explorer.

use async_trait::async_trait;
use thiserror::Error;

mod etherscan;
#[cfg(test)]
pub mod mock;

pub use etherscan::{parse_txlist, EtherscanClient};

use crate::ledger::TransactionRecord;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Explorer returned no result: {0}")]
    Unsuccessful(String),
    #[error("Malformed explorer response: {0}")]
    Decode(String),
}

/// Anything that can list the transfers involving an address.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<Vec<TransactionRecord>, ExplorerError>;
}

/// Link to a transaction on the explorer's web front end.
pub fn tx_url(web_url: &str, hash: &str) -> String {
    format!("{}/tx/{}", web_url.trim_end_matches('/'), hash)
}
