// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

//! Fixed-point token amounts.
//!
//! Every on-chain quantity is an integer scaled by the token's decimal
//! exponent (BIT = 9, stablecoins and BNB = 18). These helpers are the only
//! place that moves between raw units and display strings.

use crate::domain::constants::{
    BIT_DECIMALS, BIT_DISPLAY_DIGITS, STABLE_DECIMALS, TOKEN_DISPLAY_DIGITS,
};
use crate::domain::error::AppError;
use alloy::primitives::U256;

fn ten_pow(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Exact decimal rendering of `value / 10^decimals`, trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac}")
    }
}

/// Parse a decimal string into raw units. Accepts `,`/`_` grouping in the
/// integer part and at most `decimals` fractional digits.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, AppError> {
    let raw = text.trim();
    if raw.is_empty() {
        return Err(AppError::validation("amount", "is empty"));
    }

    let mut parts = raw.splitn(2, '.');
    let int_raw = parts.next().unwrap_or_default();
    let frac_raw = parts.next().unwrap_or_default();
    if frac_raw.contains('.') {
        return Err(AppError::validation("amount", "has more than one decimal point"));
    }

    let int_part: String = int_raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    if int_part.is_empty() && frac_raw.is_empty() {
        return Err(AppError::validation("amount", "has no digits"));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_raw.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AppError::validation(
            "amount",
            format!("'{raw}' is not a decimal number"),
        ));
    }
    if frac_raw.len() > decimals as usize {
        return Err(AppError::validation(
            "amount",
            format!("more than {decimals} decimal places"),
        ));
    }

    let mut combined = int_part;
    combined.push_str(frac_raw);
    combined.push_str(&"0".repeat(decimals as usize - frac_raw.len()));
    if combined.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(&combined, 10)
        .map_err(|_| AppError::validation("amount", format!("'{raw}' is out of range")))
}

/// Insert `,` every three digits of an unsigned integer string.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display form for a token with `decimals` places: BIT keeps
/// `BIT_DISPLAY_DIGITS` fraction digits, other tokens `TOKEN_DISPLAY_DIGITS`.
pub fn format_token(value: U256, decimals: u8) -> String {
    let digits = if decimals == BIT_DECIMALS {
        BIT_DISPLAY_DIGITS
    } else {
        TOKEN_DISPLAY_DIGITS
    };
    format_display(value, decimals, digits)
}

/// Grouped display form, truncated (never rounded up) to `max_fraction_digits`.
pub fn format_display(value: U256, decimals: u8, max_fraction_digits: usize) -> String {
    let exact = format_units(value, decimals);
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let grouped = group_thousands(int_part);

    let cut = frac_part.len().min(max_fraction_digits);
    let frac = frac_part[..cut].trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}

/// Whole BIT tokens bought for `usd_units` when one BIT costs `price_units`,
/// both scaled by the same exponent. Rounds half-up.
pub fn bit_for_usd_units(usd_units: U256, price_units: U256) -> Result<U256, AppError> {
    if price_units.is_zero() {
        return Err(AppError::validation("price", "BIT price is zero"));
    }
    let half = price_units / U256::from(2u64);
    Ok(usd_units.saturating_add(half) / price_units)
}

/// USD → BIT quote as shown in the purchase form, e.g. `"1,000,000"`.
pub fn calculate_bit(amount_usd: &str, price_per_bit: &str) -> Result<String, AppError> {
    if amount_usd.trim().is_empty() {
        return Ok("0".to_string());
    }
    let usd = parse_units(amount_usd, STABLE_DECIMALS)?;
    let price = parse_units(price_per_bit, STABLE_DECIMALS)
        .map_err(|_| AppError::validation("price", format!("'{price_per_bit}' is not a price")))?;
    let tokens = bit_for_usd_units(usd, price)?;
    Ok(group_thousands(&tokens.to_string()))
}

/// USD amount typed into the purchase form, in the paying stablecoin's units.
pub fn usd_to_stable_units(amount_usd: &str, stable_decimals: u8) -> Result<U256, AppError> {
    let units = parse_units(amount_usd, stable_decimals)
        .map_err(|_| AppError::validation("amount", format!("'{amount_usd}' is not a USD amount")))?;
    if units.is_zero() {
        return Err(AppError::validation("amount", "must be greater than zero"));
    }
    Ok(units)
}

/// Raw BIT units for a whole-token count.
pub fn whole_tokens(count: u64, decimals: u8) -> U256 {
    U256::from(count) * ten_pow(decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_units(U256::from(1_500_000_000u64), 9), "1.5");
        assert_eq!(format_units(U256::from(1_000_000_000u64), 9), "1");
        assert_eq!(format_units(U256::from(1u64), 9), "0.000000001");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn parse_recovers_formatted_values() {
        let samples = [
            U256::ZERO,
            U256::from(1u64),
            U256::from(999_999_999u64),
            U256::from(1_000_000_000u64),
            U256::from(123_456_789_012_345_678u128),
            U256::MAX,
        ];
        for decimals in [9u8, 18u8] {
            for n in samples {
                let text = format_units(n, decimals);
                let frac_len = text.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
                assert!(frac_len <= decimals as usize);
                assert_eq!(parse_units(&text, decimals).unwrap(), n, "{text}");
            }
        }
    }

    #[test]
    fn parse_rejects_excess_precision_and_garbage() {
        assert!(parse_units("0.0000000001", 9).is_err());
        assert!(parse_units("-1", 9).is_err());
        assert!(parse_units("1.2.3", 9).is_err());
        assert!(parse_units("", 9).is_err());
        assert!(parse_units(".", 9).is_err());
        assert_eq!(parse_units("1,000.5", 9).unwrap(), U256::from(1_000_500_000_000u64));
        assert_eq!(parse_units(".5", 9).unwrap(), U256::from(500_000_000u64));
    }

    #[test]
    fn display_groups_and_truncates() {
        let v = U256::from(1_234_567_899_999_999_999u128);
        assert_eq!(format_display(v, 9, 2), "1,234,567,899.99");
        assert_eq!(format_display(U256::from(1_000u64), 0, 4), "1,000");
    }

    #[test]
    fn bit_shows_two_fraction_digits_and_stables_four() {
        let v = U256::from(1_234_567_891u64);
        assert_eq!(format_token(v, BIT_DECIMALS), "1.23");
        let stable = U256::from(1_234_567_000_000_000_000u64);
        assert_eq!(format_token(stable, STABLE_DECIMALS), "1.2345");
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("1000000"), "1,000,000");
    }

    #[test]
    fn calculate_bit_matches_presale_quote() {
        assert_eq!(calculate_bit("108", "0.000108").unwrap(), "1,000,000");
        assert_eq!(calculate_bit("", "0.000108").unwrap(), "0");
        assert_eq!(calculate_bit("1", "0.3").unwrap(), "3");
        assert!(calculate_bit("10", "0").is_err());
    }

    #[test]
    fn usd_amount_scales_to_stable_units() {
        assert_eq!(
            usd_to_stable_units("12.5", 18).unwrap(),
            U256::from(12_500_000_000_000_000_000u128)
        );
        assert!(usd_to_stable_units("0", 18).is_err());
        assert!(usd_to_stable_units("abc", 18).is_err());
    }
}
