use async_trait::async_trait;
use std::sync::Mutex;

use super::{ExplorerError, HistorySource};
use crate::ledger::TransactionRecord;

/// Returns a fixed answer for every address.
pub struct StaticHistory {
    answer: Mutex<Result<Vec<TransactionRecord>, String>>,
}

impl StaticHistory {
    pub fn ok(records: Vec<TransactionRecord>) -> Self {
        Self {
            answer: Mutex::new(Ok(records)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Mutex::new(Err(message.to_string())),
        }
    }

    pub fn set(&self, answer: Result<Vec<TransactionRecord>, String>) {
        *self.answer.lock().unwrap() = answer;
    }
}

#[async_trait]
impl HistorySource for StaticHistory {
    async fn fetch(&self, _address: &str) -> Result<Vec<TransactionRecord>, ExplorerError> {
        self.answer
            .lock()
            .unwrap()
            .clone()
            .map_err(ExplorerError::Unsuccessful)
    }
}
