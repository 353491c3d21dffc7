//! Conversions between decimal ether strings and integer wei.

use alloy_primitives::utils::{format_units as format_fixed, ParseUnits, Unit};
use alloy_primitives::U256;
use thiserror::Error;

pub type Wei = U256;

pub const ETHER_DECIMALS: u8 = 18;
pub const GWEI_DECIMALS: u8 = 9;
pub const DISPLAY_DECIMALS: u8 = 4;

/// Decimal digits that always fit in a `U256`.
const MAX_DIGITS: usize = 77;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("amount is empty")]
    Empty,
    #[error("amount cannot be negative")]
    Negative,
    #[error("invalid decimal amount '{0}'")]
    Invalid(String),
    #[error("amount has more than {0} decimal places")]
    TooPrecise(u8),
    #[error("amount is too large")]
    Overflow,
}

/// Strict decimal parse. Unlike the plain unit conversion, excess precision
/// is an error instead of being truncated.
pub fn parse_units(value: &str, decimals: u8) -> Result<Wei, UnitError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UnitError::Empty);
    }
    if value.starts_with('-') {
        return Err(UnitError::Negative);
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitError::Invalid(value.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitError::TooPrecise(decimals));
    }
    if whole.trim_start_matches('0').len() + decimals as usize > MAX_DIGITS {
        return Err(UnitError::Overflow);
    }

    let unit = Unit::new(decimals).ok_or(UnitError::Overflow)?;
    match ParseUnits::parse_units(value, unit) {
        Ok(ParseUnits::U256(wei)) => Ok(wei),
        Ok(ParseUnits::I256(_)) => Err(UnitError::Negative),
        Err(_) => Err(UnitError::Invalid(value.to_string())),
    }
}

/// Renders with at least one fractional digit and no trailing zeros.
pub fn format_units(value: Wei, decimals: u8) -> String {
    let Ok(formatted) = format_fixed(value, decimals) else {
        return value.to_string();
    };
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", formatted),
    }
}

pub fn parse_ether(value: &str) -> Result<Wei, UnitError> {
    parse_units(value, ETHER_DECIMALS)
}

pub fn parse_gwei(value: &str) -> Result<Wei, UnitError> {
    parse_units(value, GWEI_DECIMALS)
}

pub fn format_ether(value: Wei) -> String {
    format_units(value, ETHER_DECIMALS)
}

/// `n` whole ether in wei.
pub fn ether(n: u64) -> Wei {
    U256::from(n) * Unit::ETHER.wei()
}

/// Four-decimal display of an ether string, rounded half-up. Dust that would
/// round to zero shows as `<0.0001` instead of disappearing. Strings that do
/// not parse are returned unchanged.
pub fn format_amount_display(amount: &str) -> String {
    let wei = match parse_ether(amount) {
        Ok(wei) => wei,
        Err(_) => return amount.to_string(),
    };

    let unit = U256::from(10u64).pow(U256::from(ETHER_DECIMALS - DISPLAY_DECIMALS));
    let mut rounded = wei / unit;
    if wei % unit >= unit / U256::from(2u64) {
        rounded += U256::from(1u64);
    }
    if !wei.is_zero() && rounded.is_zero() {
        return "<0.0001".to_string();
    }

    let display_scale = U256::from(10u64.pow(DISPLAY_DECIMALS as u32));
    let fraction = u64::try_from(rounded % display_scale).unwrap_or_default();
    format!(
        "{}.{:0width$}",
        rounded / display_scale,
        fraction,
        width = DISPLAY_DECIMALS as usize
    )
}

/// Parses a JSON-RPC quantity such as `"0x1bc16d674ec80000"`.
pub fn parse_quantity(value: &str) -> Option<Wei> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).ok()
}

pub fn to_quantity(value: Wei) -> String {
    format!("{:#x}", value)
}
