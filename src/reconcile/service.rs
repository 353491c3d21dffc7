use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::{classify, merge};
use crate::eth_rpc::{ProviderError, TransactionRequest};
use crate::explorer::HistorySource;
use crate::ledger::{LedgerError, LocalLedger, TransactionRecord, TxStatus};
use crate::metrics;
use crate::wallet::units::{parse_ether, parse_gwei, to_quantity, UnitError};
use crate::wallet::WalletSession;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Provider not available")]
    ProviderUnavailable,
    #[error("Invalid amount: {0}")]
    Amount(#[from] UnitError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Default)]
struct CachedHistory {
    /// Ticket of the fetch that produced `records`.
    applied: u64,
    records: Vec<TransactionRecord>,
}

/// Counts the operation as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Submits transfers for the connected wallet and keeps the reconciled
/// history view.
pub struct TransactionService {
    wallet: Arc<WalletSession>,
    ledger: LocalLedger,
    history: Arc<dyn HistorySource>,
    cache: RwLock<CachedHistory>,
    next_ticket: AtomicU64,
    in_flight: AtomicUsize,
}

impl TransactionService {
    pub fn new(wallet: Arc<WalletSession>, ledger: LocalLedger, history: Arc<dyn HistorySource>) -> Self {
        Self {
            wallet,
            ledger,
            history,
            cache: RwLock::new(CachedHistory::default()),
            next_ticket: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn wallet(&self) -> &Arc<WalletSession> {
        &self.wallet
    }

    /// The list from the most recent fetch, with later submissions in front.
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.cache.read().await.records.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Sends `amount` ether to `to`. Returns the hash, or `None` when the
    /// wallet refused or failed to submit. Failures before submission, such
    /// as no connected wallet or a malformed amount, are errors.
    pub async fn send_transaction(
        &self,
        to: &str,
        amount: &str,
        gas_price_gwei: Option<&str>,
    ) -> Result<Option<String>, TransactionError> {
        let from = self.wallet.address().await.ok_or(TransactionError::WalletNotConnected)?;
        let provider = self.wallet.provider().ok_or(TransactionError::ProviderUnavailable)?;

        let value = parse_ether(amount)?;
        let gas_price = gas_price_gwei
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(parse_gwei)
            .transpose()?;

        let request = TransactionRequest {
            from: from.clone(),
            to: to.to_string(),
            value: to_quantity(value),
            gas_price: gas_price.map(to_quantity),
        };

        let _loading = InFlight::start(&self.in_flight);
        let hash = match provider.send_transaction(&request).await {
            Ok(hash) => hash,
            Err(e) => {
                error!("Error sending transaction: {}", e);
                metrics::record_transaction_failed();
                return Ok(None);
            }
        };
        info!("Submitted {} ether from {} to {}: {}", amount, from, to, hash);
        metrics::record_transaction_submitted();

        let record = TransactionRecord::submitted(&from, to, amount, &hash, chrono::Utc::now().timestamp_millis());
        let mut cache = self.cache.write().await;
        // The transfer is already broadcast; a storage failure must not hide
        // its hash from the caller.
        if let Err(e) = self.ledger.append(record.clone()) {
            error!("Failed to persist transaction {}: {}", hash, e);
        }
        cache.records.insert(0, record);
        Ok(Some(hash))
    }

    /// Local ledger merged with explorer history, or the local ledger alone
    /// when the explorer cannot be reached.
    pub async fn transaction_history(&self) -> Result<Vec<TransactionRecord>, TransactionError> {
        let Some(address) = self.wallet.address().await else {
            return Ok(Vec::new());
        };

        let _loading = InFlight::start(&self.in_flight);
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let started = Instant::now();
        let remote = match self.history.fetch(&address).await {
            Ok(remote) => {
                metrics::record_history_fetch(started.elapsed(), false);
                Some(remote)
            }
            Err(e) => {
                metrics::record_history_fetch(started.elapsed(), true);
                warn!("Error fetching transaction history, showing local records only: {}", e);
                None
            }
        };

        // Submissions append to the ledger under this lock, so none can land
        // between the ledger read and the cache update.
        let mut cache = self.cache.write().await;
        let local = self.ledger.read_all()?;
        let records = match remote {
            Some(remote) => {
                debug!("Merging {} local and {} remote records", local.len(), remote.len());
                merge(&local, &remote)
            }
            None => local,
        };
        metrics::record_history_size(records.len());

        if ticket < cache.applied {
            debug!("Discarding history fetch {} superseded by {}", ticket, cache.applied);
        } else {
            cache.applied = ticket;
            cache.records = records.clone();
        }
        Ok(records)
    }

    pub async fn transaction_status(&self, hash: &str) -> Result<TxStatus, TransactionError> {
        let provider = self.wallet.provider().ok_or(TransactionError::ProviderUnavailable)?;
        Ok(classify(provider.as_ref(), hash).await?)
    }
}
