//! Key/value persistence behind an injectable trait.
//!
//! The dashboard keeps two keys: the serialized transaction list and the
//! last-connected wallet address. Everything that persists goes through
//! [`KeyValueStore`] so tests can swap in [`MemoryStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

pub mod keys {
    pub const TRANSACTIONS: &str = "transactions";
    pub const WALLET_ADDRESS: &str = "walletAddress";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store file is not a JSON object: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
