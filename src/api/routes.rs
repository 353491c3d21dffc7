use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::handlers;
use crate::reconcile::TransactionService;
use crate::wallet::WalletSession;

#[derive(Clone)]
pub struct AppState {
    pub wallet: Arc<WalletSession>,
    pub transactions: Arc<TransactionService>,
    pub explorer_web_url: Arc<str>,
}

impl AppState {
    pub fn new(transactions: Arc<TransactionService>, explorer_web_url: &str) -> Self {
        Self {
            wallet: transactions.wallet().clone(),
            transactions,
            explorer_web_url: Arc::from(explorer_web_url),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async {
            Json(json!({
                "message": "paydesk API is running"
            }))
        }))
        .route("/api/wallet", get(handlers::get_wallet))
        .route("/api/wallet/connect", post(handlers::connect_wallet))
        .route("/api/wallet/disconnect", post(handlers::disconnect_wallet))
        .route("/api/wallet/refresh", post(handlers::refresh_wallet))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route(
            "/api/transactions",
            get(handlers::get_transactions).post(handlers::send_transaction),
        )
        .route("/api/transactions/:hash/status", get(handlers::get_transaction_status))
        .fallback(handlers::not_found)
        .with_state(state)
}
