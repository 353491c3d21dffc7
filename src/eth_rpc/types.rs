use serde::{Deserialize, Serialize};

use crate::wallet::units::parse_quantity;

/// Parameters for `eth_sendTransaction`. Quantities are hex strings. Gas
/// and nonce are left to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    pub value: String,
    #[serde(default)]
    pub block_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` on success, `0x0` on revert. Pre-Byzantium receipts omit it.
    #[serde(default)]
    pub status: Option<String>,
}

impl RpcReceipt {
    pub fn is_success(&self) -> bool {
        self.status.as_deref().and_then(parse_quantity) == Some(alloy_primitives::U256::from(1))
    }
}

/// Notifications a wallet pushes when the user switches account or network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}
