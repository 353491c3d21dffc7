use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::eth_rpc::ProviderError;
use crate::ledger::TxStatus;
use crate::reconcile::TransactionError;
use crate::wallet::{TransferError, WalletError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("{0}")]
    Validation(String),
    #[error("No wallet provider available")]
    ProviderUnavailable,
    #[error("Wallet provider error: {0}")]
    Provider(String),
    #[error("Transaction failed. Please try again.")]
    SubmissionFailed,
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::NotConnected => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Provider(_) | ApiError::SubmissionFailed => StatusCode::BAD_GATEWAY,
            ApiError::Internal(ref e) => {
                error!("Internal error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ProviderUnavailable => ApiError::ProviderUnavailable,
            WalletError::Storage(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::WalletNotConnected => ApiError::NotConnected,
            TransactionError::ProviderUnavailable => ApiError::ProviderUnavailable,
            TransactionError::Amount(e) => ApiError::Validation(e.to_string()),
            TransactionError::Provider(ProviderError::Unavailable(e)) => {
                error!("Wallet provider unreachable: {}", e);
                ApiError::ProviderUnavailable
            }
            TransactionError::Provider(e) => ApiError::Provider(e.to_string()),
            TransactionError::Ledger(e) => ApiError::Internal(e.into()),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub message: String,
    pub hash: String,
    pub explorer_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub hash: String,
    pub status: TxStatus,
}
