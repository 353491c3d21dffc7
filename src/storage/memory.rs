use dashmap::DashMap;

use super::{KeyValueStore, StorageError};

/// Ephemeral store, nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("walletAddress").unwrap(), None);

        store.set("walletAddress", "0xabc").unwrap();
        assert_eq!(store.get("walletAddress").unwrap().as_deref(), Some("0xabc"));

        store.set("walletAddress", "0xdef").unwrap();
        assert_eq!(store.get("walletAddress").unwrap().as_deref(), Some("0xdef"));

        store.remove("walletAddress").unwrap();
        assert_eq!(store.get("walletAddress").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }
}
