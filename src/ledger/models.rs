use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Failed => "failed",
        }
    }

    /// Confirmed and failed never change once a receipt exists.
    pub fn is_final(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TxStatus::Pending),
            "confirmed" => Ok(TxStatus::Confirmed),
            "failed" => Ok(TxStatus::Failed),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// A transfer as the dashboard shows it. `hash` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    /// Ether amount as a decimal string, e.g. "0.25".
    pub amount: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub status: TxStatus,
    pub hash: String,
}

impl TransactionRecord {
    /// Optimistic record for a transfer this process just submitted.
    pub fn submitted(from: &str, to: &str, amount: &str, hash: &str, timestamp: i64) -> Self {
        Self {
            id: timestamp.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
            timestamp,
            status: TxStatus::Pending,
            hash: hash.to_string(),
        }
    }

    pub fn is_sent_by(&self, address: &str) -> bool {
        self.from.eq_ignore_ascii_case(address)
    }

    pub fn is_received_by(&self, address: &str) -> bool {
        self.to.eq_ignore_ascii_case(address)
    }
}
