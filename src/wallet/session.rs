use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::units::{format_amount_display, format_ether, Wei};
use crate::eth_rpc::{ProviderError, ProviderEvent, WalletProvider};
use crate::storage::{keys, KeyValueStore, StorageError};

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No wallet provider available. Configure a provider URL to use this feature.")]
    ProviderUnavailable,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletState {
    pub is_connected: bool,
    pub address: Option<String>,
    pub balance: Wei,
}

impl WalletState {
    pub fn balance_ether(&self) -> String {
        format_ether(self.balance)
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        let balance = self.balance_ether();
        WalletSnapshot {
            is_connected: self.is_connected,
            address: self.address.clone(),
            balance_display: format_amount_display(&balance),
            balance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletSnapshot {
    pub is_connected: bool,
    pub address: Option<String>,
    pub balance: String,
    pub balance_display: String,
}

/// Connection state for one wallet. The last connected address is persisted
/// under [`keys::WALLET_ADDRESS`] so a restart can reconnect silently.
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    store: Arc<dyn KeyValueStore>,
    state: RwLock<WalletState>,
}

impl WalletSession {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            provider,
            store,
            state: RwLock::new(WalletState::default()),
        }
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub async fn state(&self) -> WalletState {
        self.state.read().await.clone()
    }

    pub async fn address(&self) -> Option<String> {
        let state = self.state.read().await;
        state.address.clone().filter(|_| state.is_connected)
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected
    }

    /// Silently reconnects if an address was stored by an earlier session
    /// and the provider still exposes an account. Never prompts.
    pub async fn restore(&self) -> WalletState {
        let stored = match self.store.get(keys::WALLET_ADDRESS) {
            Ok(stored) => stored,
            Err(e) => {
                error!("Error reading stored wallet address: {}", e);
                None
            }
        };
        let (Some(stored), Some(provider)) = (stored, self.provider.as_ref()) else {
            return self.state().await;
        };

        debug!("Found stored wallet address {}, checking provider", stored);
        match provider.accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    if let Err(e) = self.establish(&**provider, account).await {
                        error!("Error restoring wallet connection: {}", e);
                    }
                }
                None => debug!("Provider exposes no accounts, staying disconnected"),
            },
            Err(e) => error!("Error checking if wallet is connected: {}", e),
        }
        self.state().await
    }

    /// Requests account access and connects to the first account returned.
    /// A rejection or any other provider failure leaves the previous state
    /// untouched; only a missing provider is reported.
    pub async fn connect(&self) -> Result<WalletState, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::ProviderUnavailable)?;

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(ProviderError::Unavailable(e)) => {
                warn!("Wallet provider unreachable: {}", e);
                return Err(WalletError::ProviderUnavailable);
            }
            Err(e) => {
                error!("Error connecting wallet: {}", e);
                return Ok(self.state().await);
            }
        };

        match accounts.into_iter().next() {
            Some(account) => self.establish(&**provider, account).await?,
            None => warn!("Wallet returned no accounts"),
        }
        Ok(self.state().await)
    }

    /// Records the connection once the balance has loaded. A failed balance
    /// lookup leaves the session and the stored address untouched.
    async fn establish(&self, provider: &dyn WalletProvider, account: String) -> Result<(), WalletError> {
        let balance = match provider.get_balance(&account).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("Error loading balance for {}: {}", account, e);
                return Ok(());
            }
        };

        self.store.set(keys::WALLET_ADDRESS, &account)?;
        let mut state = self.state.write().await;
        *state = WalletState {
            is_connected: true,
            address: Some(account.clone()),
            balance,
        };
        info!("Wallet connected: {}", account);
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<WalletState, WalletError> {
        self.store.remove(keys::WALLET_ADDRESS)?;
        let mut state = self.state.write().await;
        *state = WalletState::default();
        info!("Wallet disconnected");
        Ok(state.clone())
    }

    /// Reloads the balance. Failures keep the last known balance.
    pub async fn refresh_balance(&self) -> WalletState {
        let (Some(address), Some(provider)) = (self.address().await, self.provider.as_ref()) else {
            return self.state().await;
        };

        match provider.get_balance(&address).await {
            Ok(balance) => {
                let mut state = self.state.write().await;
                // The account may have switched while the call was in flight.
                if state.address.as_deref() == Some(address.as_str()) {
                    state.balance = balance;
                }
            }
            Err(e) => error!("Error updating balance: {}", e),
        }
        self.state().await
    }

    pub async fn handle_event(&self, event: ProviderEvent) -> Result<(), WalletError> {
        if !self.is_connected().await {
            debug!("Ignoring {:?} while disconnected", event);
            return Ok(());
        }

        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    self.disconnect().await?;
                }
                Some(account) => {
                    info!("Active account changed to {}", account);
                    self.store.set(keys::WALLET_ADDRESS, &account)?;
                    self.state.write().await.address = Some(account);
                    self.refresh_balance().await;
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                info!("Chain changed to {}, reloading wallet session", chain_id);
                *self.state.write().await = WalletState::default();
                self.restore().await;
            }
        }
        Ok(())
    }

    /// Applies provider events for as long as the provider keeps its channel
    /// open.
    pub fn spawn_event_listener(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.provider.as_ref()?.subscribe();
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Err(e) = self.handle_event(event).await {
                            error!("Error handling provider event: {}", e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!("Missed {} provider events", skipped),
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }
}
