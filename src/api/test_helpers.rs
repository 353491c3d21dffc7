use anyhow::Result;
use axum::Router;
use std::sync::Arc;

use super::{create_router, AppState};
use crate::eth_rpc::mock::MockProvider;
use crate::eth_rpc::WalletProvider;
use crate::explorer::mock::StaticHistory;
use crate::ledger::LocalLedger;
use crate::reconcile::TransactionService;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::wallet::units::ether;
use crate::wallet::WalletSession;

pub const ALICE: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
pub const EXPLORER_WEB_URL: &str = "https://sepolia.etherscan.io";

pub struct TestApp {
    pub app: Router,
    pub provider: Arc<MockProvider>,
    pub history: Arc<StaticHistory>,
    pub ledger: LocalLedger,
    pub state: AppState,
}

pub fn setup_test_app() -> TestApp {
    let provider = Arc::new(MockProvider::with_account(ALICE, ether(2)));
    build(Some(provider.clone() as Arc<dyn WalletProvider>), provider)
}

pub fn setup_test_app_without_provider() -> TestApp {
    build(None, Arc::new(MockProvider::new()))
}

fn build(provider: Option<Arc<dyn WalletProvider>>, mock: Arc<MockProvider>) -> TestApp {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let history = Arc::new(StaticHistory::ok(vec![]));
    let wallet = Arc::new(WalletSession::new(provider, store.clone()));
    let ledger = LocalLedger::new(store);
    let transactions = Arc::new(TransactionService::new(wallet, ledger.clone(), history.clone()));
    let state = AppState::new(transactions, EXPLORER_WEB_URL);

    TestApp {
        app: create_router(state.clone()),
        provider: mock,
        history,
        ledger,
        state,
    }
}

pub async fn setup_connected_app() -> Result<TestApp> {
    let test_app = setup_test_app();
    test_app.state.wallet.connect().await?;
    Ok(test_app)
}
