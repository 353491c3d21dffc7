//! In-memory wallet provider for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{ProviderError, ProviderEvent, RpcReceipt, RpcTransaction, TransactionRequest, WalletProvider};
use crate::wallet::units::Wei;

#[derive(Default)]
struct MockState {
    accounts: Vec<String>,
    chain_id: String,
    balances: HashMap<String, Wei>,
    transactions: HashMap<String, RpcTransaction>,
    receipts: HashMap<String, RpcReceipt>,
    sent: Vec<TransactionRequest>,
    reject_requests: bool,
    unavailable: bool,
    fail_sends: bool,
    fail_balance: bool,
    fail_lookups: bool,
}

pub struct MockProvider {
    state: Mutex<MockState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(MockState {
                chain_id: "0x1".to_string(),
                ..Default::default()
            }),
            events,
        }
    }

    pub fn with_account(address: &str, balance: Wei) -> Self {
        let provider = Self::new();
        provider.set_accounts(&[address]);
        provider.set_balance(address, balance);
        provider
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        self.state().accounts = accounts.iter().map(|a| a.to_string()).collect();
    }

    pub fn set_balance(&self, address: &str, balance: Wei) {
        self.state().balances.insert(address.to_lowercase(), balance);
    }

    pub fn set_chain_id(&self, chain_id: &str) {
        self.state().chain_id = chain_id.to_string();
    }

    pub fn insert_transaction(&self, hash: &str) {
        self.state().transactions.insert(
            hash.to_string(),
            RpcTransaction {
                hash: hash.to_string(),
                from: "0x0".to_string(),
                to: None,
                value: "0x0".to_string(),
                block_number: None,
            },
        );
    }

    pub fn insert_receipt(&self, hash: &str, success: bool) {
        self.state().receipts.insert(
            hash.to_string(),
            RpcReceipt {
                transaction_hash: hash.to_string(),
                block_number: Some("0x10".to_string()),
                status: Some(if success { "0x1" } else { "0x0" }.to_string()),
            },
        );
    }

    pub fn reject_requests(&self, reject: bool) {
        self.state().reject_requests = reject;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    pub fn fail_balance(&self, fail: bool) {
        self.state().fail_balance = fail;
    }

    pub fn fail_transaction_lookups(&self, fail: bool) {
        self.state().fail_lookups = fail;
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.state().unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.check_available()?;
        Ok(self.state().accounts.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.check_available()?;
        let state = self.state();
        if state.reject_requests {
            return Err(ProviderError::UserRejected("User rejected the request.".to_string()));
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        self.check_available()?;
        Ok(self.state().chain_id.clone())
    }

    async fn get_balance(&self, address: &str) -> Result<Wei, ProviderError> {
        self.check_available()?;
        let state = self.state();
        if state.fail_balance {
            return Err(ProviderError::Rpc {
                code: -32000,
                message: "header not found".to_string(),
            });
        }
        Ok(state.balances.get(&address.to_lowercase()).copied().unwrap_or_default())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, ProviderError> {
        self.check_available()?;
        let mut state = self.state();
        if state.fail_sends {
            return Err(ProviderError::UserRejected("User denied transaction signature.".to_string()));
        }
        state.sent.push(request.clone());
        Ok(format!("0x{:064x}", state.sent.len()))
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>, ProviderError> {
        self.check_available()?;
        let state = self.state();
        if state.fail_lookups {
            return Err(ProviderError::Rpc {
                code: -32603,
                message: "internal error".to_string(),
            });
        }
        Ok(state.transactions.get(hash).cloned())
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ProviderError> {
        self.check_available()?;
        Ok(self.state().receipts.get(hash).cloned())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
