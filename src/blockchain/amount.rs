// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decimal amount conversion between user input and token base units.

use alloy::primitives::U256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid amount format")]
    Format,

    #[error("Too many decimal places (max {0})")]
    Precision(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable amount to base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (6 for message payments)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 || (parts[0].is_empty() && parts.get(1).is_none_or(|d| d.is_empty())) {
        return Err(AmountError::Format);
    }

    let whole = if parts[0].is_empty() {
        0u128
    } else {
        parts[0].parse::<u128>().map_err(|_| AmountError::Format)?
    };

    let decimal_part = match parts.get(1) {
        Some(dec_str) if !dec_str.is_empty() => {
            if dec_str.len() > decimals as usize {
                return Err(AmountError::Precision(decimals));
            }
            if !dec_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(AmountError::Format);
            }
            // Pad with zeros to match decimals
            let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
            padded.parse::<u128>().map_err(|_| AmountError::Format)?
        }
        _ => 0u128,
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)?;

    Ok(U256::from(total))
}

/// Parse an optional payment field. Blank and zero both mean "no payment".
pub fn parse_payment(amount: Option<&str>, decimals: u8) -> Result<Option<U256>, AmountError> {
    match amount.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let value = parse_amount(raw, decimals)?;
            Ok((!value.is_zero()).then_some(value))
        }
    }
}

/// Format base units to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_six_decimals() {
        assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_amount("0.000001", 6).unwrap(), U256::from(1u64));
        assert_eq!(parse_amount("12", 6).unwrap(), U256::from(12_000_000u64));
        assert_eq!(parse_amount(".25", 6).unwrap(), U256::from(250_000u64));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("1.2.3", 6), Err(AmountError::Format));
        assert_eq!(parse_amount("abc", 6), Err(AmountError::Format));
        assert_eq!(parse_amount(".", 6), Err(AmountError::Format));
        assert_eq!(parse_amount("1.1234567", 6), Err(AmountError::Precision(6)));
        assert_eq!(parse_amount("1.-5", 6), Err(AmountError::Format));
    }

    #[test]
    fn test_parse_payment_treats_zero_as_absent() {
        assert_eq!(parse_payment(None, 6), Ok(None));
        assert_eq!(parse_payment(Some("  "), 6), Ok(None));
        assert_eq!(parse_payment(Some("0"), 6), Ok(None));
        assert_eq!(parse_payment(Some("0.000"), 6), Ok(None));
        assert_eq!(parse_payment(Some("2"), 6), Ok(Some(U256::from(2_000_000u64))));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_amount(U256::ZERO, 6), "0");
    }
}
