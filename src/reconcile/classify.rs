use tracing::debug;

use crate::eth_rpc::{ProviderError, WalletProvider};
use crate::ledger::TxStatus;

/// Blocks an explorer transaction needs on top of it before it counts as
/// confirmed.
pub const CONFIRMATION_THRESHOLD: u64 = 12;

pub fn status_from_confirmations(confirmations: u64) -> TxStatus {
    if confirmations > CONFIRMATION_THRESHOLD {
        TxStatus::Confirmed
    } else {
        TxStatus::Pending
    }
}

/// Asks the provider for the transaction and its receipt. Unknown
/// transactions and missing receipts are pending; a receipt decides between
/// confirmed and failed. Runs once per call, there is no polling.
pub async fn classify<P>(provider: &P, hash: &str) -> Result<TxStatus, ProviderError>
where
    P: WalletProvider + ?Sized,
{
    if provider.get_transaction(hash).await?.is_none() {
        debug!("{} unknown to provider, treating as pending", hash);
        return Ok(TxStatus::Pending);
    }

    let status = match provider.get_transaction_receipt(hash).await? {
        None => TxStatus::Pending,
        Some(receipt) if receipt.is_success() => TxStatus::Confirmed,
        Some(_) => TxStatus::Failed,
    };
    debug!("{} classified as {}", hash, status);
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth_rpc::mock::MockProvider;

    #[test]
    fn test_confirmation_threshold() {
        assert_eq!(status_from_confirmations(0), TxStatus::Pending);
        assert_eq!(status_from_confirmations(12), TxStatus::Pending);
        assert_eq!(status_from_confirmations(13), TxStatus::Confirmed);
        assert_eq!(status_from_confirmations(20), TxStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_pending() {
        let provider = MockProvider::new();
        assert_eq!(classify(&provider, "0xnope").await.unwrap(), TxStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_receipt_is_pending() {
        let provider = MockProvider::new();
        provider.insert_transaction("0xa");
        assert_eq!(classify(&provider, "0xa").await.unwrap(), TxStatus::Pending);
    }

    #[tokio::test]
    async fn test_receipt_outcome() {
        let provider = MockProvider::new();
        provider.insert_transaction("0xok");
        provider.insert_receipt("0xok", true);
        provider.insert_transaction("0xbad");
        provider.insert_receipt("0xbad", false);

        assert_eq!(classify(&provider, "0xok").await.unwrap(), TxStatus::Confirmed);
        assert_eq!(classify(&provider, "0xbad").await.unwrap(), TxStatus::Failed);
    }

    #[tokio::test]
    async fn test_final_status_is_stable() {
        let provider = MockProvider::new();
        provider.insert_transaction("0xa");
        provider.insert_receipt("0xa", true);

        let first = classify(&provider, "0xa").await.unwrap();
        assert!(first.is_final());
        for _ in 0..3 {
            assert_eq!(classify(&provider, "0xa").await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let provider = MockProvider::new();
        provider.set_unavailable(true);
        assert!(matches!(
            classify(&provider, "0xa").await,
            Err(ProviderError::Unavailable(_))
        ));
    }
}
