use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::models::TransactionRecord;
use crate::storage::{keys, KeyValueStore, StorageError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Stored transaction list is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Locally submitted transfers, newest first, persisted under
/// [`keys::TRANSACTIONS`]. Writes are read-modify-write with no locking, the
/// last writer wins.
#[derive(Clone)]
pub struct LocalLedger {
    store: Arc<dyn KeyValueStore>,
}

impl LocalLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn read_all(&self) -> Result<Vec<TransactionRecord>, LedgerError> {
        match self.store.get(keys::TRANSACTIONS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn append(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        let mut records = self.read_all()?;
        debug!("Appending {} to local ledger ({} stored)", record.hash, records.len());
        records.insert(0, record);
        self.store
            .set(keys::TRANSACTIONS, &serde_json::to_string(&records)?)?;
        Ok(())
    }
}
