use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{JsonRpcProvider, ProviderEvent, WalletProvider};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Observed {
    accounts: Vec<String>,
    chain_id: Option<String>,
}

/// Polls an HTTP provider for account and chain switches and republishes
/// them as [`ProviderEvent`]s, the way a browser wallet would push them.
pub struct AccountWatcher {
    provider: JsonRpcProvider,
    interval: Duration,
}

impl AccountWatcher {
    pub fn new(provider: JsonRpcProvider, interval: Duration) -> Self {
        Self { provider, interval }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        info!("Watching {} for account and chain changes every {:?}", self.provider.url(), self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        let mut last: Option<Observed> = None;

        loop {
            ticker.tick().await;
            let Some(current) = self.observe().await else {
                continue;
            };
            if let Some(previous) = &last {
                for event in changes(previous, &current) {
                    debug!("Provider event: {:?}", event);
                    self.provider.emit(event);
                }
            }
            last = Some(current);
        }
    }

    async fn observe(&self) -> Option<Observed> {
        let accounts = match self.provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                debug!("Account poll failed: {}", e);
                return None;
            }
        };
        let chain_id = match self.provider.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                debug!("Chain poll failed: {}", e);
                None
            }
        };
        Some(Observed { accounts, chain_id })
    }
}

fn changes(previous: &Observed, current: &Observed) -> Vec<ProviderEvent> {
    let mut events = Vec::new();
    if previous.accounts != current.accounts {
        events.push(ProviderEvent::AccountsChanged(current.accounts.clone()));
    }
    if let (Some(old), Some(new)) = (&previous.chain_id, &current.chain_id) {
        if old != new {
            events.push(ProviderEvent::ChainChanged(new.clone()));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(accounts: &[&str], chain: Option<&str>) -> Observed {
        Observed {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            chain_id: chain.map(str::to_string),
        }
    }

    #[test]
    fn test_no_change_no_events() {
        let a = observed(&["0x1"], Some("0x1"));
        assert!(changes(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_account_switch() {
        let events = changes(&observed(&["0x1"], Some("0x1")), &observed(&["0x2"], Some("0x1")));
        assert_eq!(events, vec![ProviderEvent::AccountsChanged(vec!["0x2".into()])]);
    }

    #[test]
    fn test_accounts_cleared() {
        let events = changes(&observed(&["0x1"], Some("0x1")), &observed(&[], Some("0x1")));
        assert_eq!(events, vec![ProviderEvent::AccountsChanged(vec![])]);
    }

    #[test]
    fn test_chain_switch_ignores_failed_poll() {
        let events = changes(&observed(&["0x1"], Some("0x1")), &observed(&["0x1"], Some("0xaa36a7")));
        assert_eq!(events, vec![ProviderEvent::ChainChanged("0xaa36a7".into())]);

        assert!(changes(&observed(&["0x1"], Some("0x1")), &observed(&["0x1"], None)).is_empty());
    }
}
