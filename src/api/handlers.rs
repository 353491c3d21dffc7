use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use super::routes::AppState;
use super::types::{ApiError, SendResponse, StatusResponse, TransactionQuery};
use crate::explorer::tx_url;
use crate::reconcile::view::{sort_for_display, DashboardSummary, TransactionFilter, TransactionRow};
use crate::wallet::{TransferForm, WalletSnapshot};

async fn connected_address(state: &AppState) -> Result<String, ApiError> {
    state.wallet.address().await.ok_or(ApiError::NotConnected)
}

pub async fn get_wallet(State(state): State<AppState>) -> Json<WalletSnapshot> {
    Json(state.wallet.state().await.snapshot())
}

pub async fn connect_wallet(State(state): State<AppState>) -> Result<Json<WalletSnapshot>, ApiError> {
    let wallet = state.wallet.connect().await?;
    Ok(Json(wallet.snapshot()))
}

pub async fn disconnect_wallet(State(state): State<AppState>) -> Result<Json<WalletSnapshot>, ApiError> {
    let wallet = state.wallet.disconnect().await?;
    Ok(Json(wallet.snapshot()))
}

pub async fn refresh_wallet(State(state): State<AppState>) -> Json<WalletSnapshot> {
    Json(state.wallet.refresh_balance().await.snapshot())
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    let address = connected_address(&state).await?;
    let records = state.transactions.transaction_history().await?;
    let wallet = state.wallet.state().await;

    Ok(Json(DashboardSummary::build(
        &address,
        &wallet,
        &records,
        &state.explorer_web_url,
    )))
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionRow>>, ApiError> {
    let filter = TransactionFilter::new(query.status.as_deref(), query.q.as_deref())
        .map_err(ApiError::Validation)?;
    let address = connected_address(&state).await?;

    let mut records = state.transactions.transaction_history().await?;
    sort_for_display(&mut records);

    let rows = filter
        .apply(&records)
        .into_iter()
        .map(|r| TransactionRow::new(r, &address, &state.explorer_web_url))
        .collect();
    Ok(Json(rows))
}

pub async fn send_transaction(
    State(state): State<AppState>,
    Json(form): Json<TransferForm>,
) -> Result<Json<SendResponse>, ApiError> {
    let wallet = state.wallet.state().await;
    if !wallet.is_connected {
        return Err(ApiError::NotConnected);
    }
    form.validate(wallet.balance)?;

    let hash = state
        .transactions
        .send_transaction(form.to.trim(), form.amount.trim(), form.gas_price())
        .await?
        .ok_or(ApiError::SubmissionFailed)?;

    info!("Transaction sent: {}", hash);
    Ok(Json(SendResponse {
        message: "Transaction sent successfully!".to_string(),
        explorer_url: tx_url(&state.explorer_web_url, &hash),
        hash,
    }))
}

pub async fn get_transaction_status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.transactions.transaction_status(&hash).await?;
    Ok(Json(StatusResponse { hash, status }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
