// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use alloy::primitives::Address;
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn parse_address_hex(s: &str) -> Option<Address> {
    Address::from_str(strip_0x(s.trim())).ok()
}

/// Keep only ASCII digits, e.g. `"+234 (800) 000-0000"` → `"2348000000000"`.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parser_accepts_lower_and_upper_prefixes() {
        assert_eq!(
            parse_address_hex("0X0000000000000000000000000000000000000002"),
            Some(Address::with_last_byte(2))
        );
        assert_eq!(
            parse_address_hex(" 0x0000000000000000000000000000000000000001 "),
            Some(Address::with_last_byte(1))
        );
        assert_eq!(parse_address_hex("0x12"), None);
    }

    #[test]
    fn digits_only_strips_phone_formatting() {
        assert_eq!(digits_only("+234 (800) 000-0000"), "2348000000000");
        assert_eq!(digits_only("n/a"), "");
    }
}
