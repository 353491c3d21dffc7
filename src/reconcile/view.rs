//! Read-only projections of the reconciled history for display.

use serde::Serialize;

use crate::explorer::tx_url;
use crate::ledger::{TransactionRecord, TxStatus};
use crate::wallet::address::{shorten_address, shorten_hash};
use crate::wallet::units::format_amount_display;
use crate::wallet::WalletState;

pub const RECENT_LIMIT: usize = 5;

/// Newest first. Equal timestamps keep their relative order.
pub fn sort_for_display(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// `None` shows every status.
    pub status: Option<TxStatus>,
    pub query: Option<String>,
}

impl TransactionFilter {
    /// Parses the status selector; `"all"` and empty mean no status filter.
    pub fn new(status: Option<&str>, query: Option<&str>) -> Result<Self, String> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse::<TxStatus>()?),
        };
        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        Ok(Self { status, query })
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        match &self.query {
            Some(q) => [&record.hash, &record.from, &record.to]
                .iter()
                .any(|field| field.to_lowercase().contains(q)),
            None => true,
        }
    }

    pub fn apply(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub direction: Direction,
    /// "To: 0x1234...abcd" for sends, "From: ..." otherwise.
    pub counterparty: String,
    pub amount_display: String,
    pub short_hash: String,
    pub explorer_url: String,
}

impl TransactionRow {
    pub fn new(record: TransactionRecord, owner: &str, explorer_web_url: &str) -> Self {
        let (direction, counterparty) = if record.is_sent_by(owner) {
            (Direction::Sent, format!("To: {}", shorten_address(&record.to)))
        } else {
            (Direction::Received, format!("From: {}", shorten_address(&record.from)))
        };
        Self {
            direction,
            counterparty,
            amount_display: format_amount_display(&record.amount),
            short_hash: shorten_hash(&record.hash),
            explorer_url: tx_url(explorer_web_url, &record.hash),
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub address: String,
    pub balance: String,
    pub balance_display: String,
    pub sent_count: usize,
    pub received_count: usize,
    pub recent: Vec<TransactionRow>,
}

impl DashboardSummary {
    pub fn build(
        address: &str,
        wallet: &WalletState,
        records: &[TransactionRecord],
        explorer_web_url: &str,
    ) -> Self {
        let mut sorted = records.to_vec();
        sort_for_display(&mut sorted);
        let snapshot = wallet.snapshot();

        Self {
            address: address.to_string(),
            balance: snapshot.balance,
            balance_display: snapshot.balance_display,
            sent_count: records.iter().filter(|r| r.is_sent_by(address)).count(),
            received_count: records.iter().filter(|r| r.is_received_by(address)).count(),
            recent: sorted
                .into_iter()
                .take(RECENT_LIMIT)
                .map(|r| TransactionRow::new(r, address, explorer_web_url))
                .collect(),
        }
    }
}
