use serde::Deserialize;
use thiserror::Error;

use super::address::is_valid_address;
use super::units::{parse_ether, parse_gwei, Wei};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Invalid Ethereum address")]
    InvalidAddress,
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Invalid gas price")]
    InvalidGasPrice,
}

/// A send request as the user typed it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferForm {
    pub to: String,
    pub amount: String,
    /// Gwei. Empty or absent lets the network suggest one.
    #[serde(default)]
    pub gas_price: Option<String>,
}

impl TransferForm {
    pub fn gas_price(&self) -> Option<&str> {
        self.gas_price.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }

    /// Checks run in the order the user sees them: required fields,
    /// recipient, amount, balance, then the optional gas price.
    pub fn validate(&self, balance: Wei) -> Result<Wei, TransferError> {
        let to = self.to.trim();
        let amount = self.amount.trim();
        if to.is_empty() || amount.is_empty() {
            return Err(TransferError::MissingFields);
        }
        if !is_valid_address(to) {
            return Err(TransferError::InvalidAddress);
        }

        let value = parse_ether(amount).map_err(|_| TransferError::InvalidAmount)?;
        if value.is_zero() {
            return Err(TransferError::NonPositiveAmount);
        }
        if value > balance {
            return Err(TransferError::InsufficientBalance);
        }

        if let Some(gas_price) = self.gas_price() {
            parse_gwei(gas_price).map_err(|_| TransferError::InvalidGasPrice)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::units::ether;
    use alloy_primitives::U256;

    const RECIPIENT: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

    fn form(to: &str, amount: &str) -> TransferForm {
        TransferForm {
            to: to.to_string(),
            amount: amount.to_string(),
            gas_price: None,
        }
    }

    #[test]
    fn test_valid_transfer() {
        assert_eq!(form(RECIPIENT, "0.5").validate(ether(1)), Ok(U256::from(500_000_000_000_000_000u64)));
        assert_eq!(form(RECIPIENT, "1").validate(ether(1)), Ok(ether(1)));
    }

    #[test]
    fn test_missing_fields_checked_first() {
        assert_eq!(form("", "abc").validate(U256::ZERO), Err(TransferError::MissingFields));
        assert_eq!(form("not-an-address", " ").validate(U256::ZERO), Err(TransferError::MissingFields));
    }

    #[test]
    fn test_address_checked_before_amount() {
        assert_eq!(form("0x123", "0").validate(U256::ZERO), Err(TransferError::InvalidAddress));
    }

    #[test]
    fn test_amount_rules() {
        assert_eq!(form(RECIPIENT, "abc").validate(ether(1)), Err(TransferError::InvalidAmount));
        assert_eq!(form(RECIPIENT, "-1").validate(ether(1)), Err(TransferError::InvalidAmount));
        assert_eq!(form(RECIPIENT, "0.0").validate(ether(1)), Err(TransferError::NonPositiveAmount));
        assert_eq!(
            form(RECIPIENT, "1.000000000000000001").validate(ether(1)),
            Err(TransferError::InsufficientBalance)
        );
    }

    #[test]
    fn test_gas_price() {
        let mut f = form(RECIPIENT, "0.1");
        f.gas_price = Some("  ".to_string());
        assert_eq!(f.gas_price(), None);
        assert!(f.validate(ether(1)).is_ok());

        f.gas_price = Some("25".to_string());
        assert_eq!(f.gas_price(), Some("25"));
        assert!(f.validate(ether(1)).is_ok());

        f.gas_price = Some("fast".to_string());
        assert_eq!(f.validate(ether(1)), Err(TransferError::InvalidGasPrice));
    }
}
