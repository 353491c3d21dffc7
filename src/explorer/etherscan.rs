use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{ExplorerError, HistorySource};
use crate::ledger::TransactionRecord;
use crate::reconcile::status_from_confirmations;
use crate::wallet::units::format_ether;

const START_BLOCK: &str = "0";
const END_BLOCK: &str = "99999999";

/// One row of an Etherscan `txlist` result. Every field arrives as a string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtherscanTx {
    hash: String,
    from: String,
    #[serde(default)]
    to: String,
    value: String,
    time_stamp: String,
    #[serde(default)]
    confirmations: String,
}

impl EtherscanTx {
    fn into_record(self) -> Result<TransactionRecord, ExplorerError> {
        let value = U256::from_str_radix(&self.value, 10)
            .map_err(|_| ExplorerError::Decode(format!("bad value '{}' for {}", self.value, self.hash)))?;
        let timestamp = self
            .time_stamp
            .parse::<i64>()
            .ok()
            .and_then(|seconds| seconds.checked_mul(1000))
            .ok_or_else(|| ExplorerError::Decode(format!("bad timeStamp '{}' for {}", self.time_stamp, self.hash)))?;
        let confirmations: u64 = self.confirmations.parse().unwrap_or(0);

        Ok(TransactionRecord {
            id: self.hash.clone(),
            from: self.from,
            to: self.to,
            amount: format_ether(value),
            timestamp,
            status: status_from_confirmations(confirmations),
            hash: self.hash,
        })
    }
}

/// Maps an Etherscan `{status, message, result}` envelope to records.
pub fn parse_txlist(body: Value) -> Result<Vec<TransactionRecord>, ExplorerError> {
    if body["status"].as_str() != Some("1") {
        let message = body["message"].as_str().unwrap_or("unknown").to_string();
        let detail = match &body["result"] {
            Value::String(s) => format!("{}: {}", message, s),
            _ => message,
        };
        return Err(ExplorerError::Unsuccessful(detail));
    }

    let rows: Vec<EtherscanTx> = serde_json::from_value(body["result"].clone())
        .map_err(|e| ExplorerError::Decode(e.to_string()))?;
    rows.into_iter().map(EtherscanTx::into_record).collect()
}

#[derive(Debug, Clone)]
pub struct EtherscanClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(api_url: String, api_key: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        info!("Initialized explorer client for: {}", api_url);
        Self {
            client,
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl HistorySource for EtherscanClient {
    async fn fetch(&self, address: &str) -> Result<Vec<TransactionRecord>, ExplorerError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", START_BLOCK),
                ("endblock", END_BLOCK),
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExplorerError::Http(response.status().as_u16()));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ExplorerError::Decode(e.to_string()))?;
        let records = parse_txlist(body)?;
        debug!("Explorer returned {} transactions for {}", records.len(), address);
        Ok(records)
    }
}
