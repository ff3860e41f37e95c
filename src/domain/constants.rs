// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use alloy::primitives::{Address, address};
use lazy_static::lazy_static;
use std::collections::HashMap;

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_BSC: u64 = 56;
pub const CHAIN_BSC_TESTNET: u64 = 97;
pub const CHAIN_POLYGON: u64 = 137;
pub const CHAIN_BASE: u64 = 8453;
pub const CHAIN_ARBITRUM: u64 = 42161;

/// Chains write actions are allowed on.
pub const SUPPORTED_CHAINS: [u64; 2] = [CHAIN_BSC, CHAIN_BSC_TESTNET];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: u64,
    pub name: &'static str,
    pub native_symbol: &'static str,
    /// Inactive chains are advertised in the network picker but not usable.
    pub active: bool,
    pub explorer_url: &'static str,
    pub default_rpc: Option<&'static str>,
}

lazy_static! {
    pub static ref CHAINS: HashMap<u64, ChainInfo> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_BSC, ChainInfo {
            id: CHAIN_BSC,
            name: "BNB Smart Chain",
            native_symbol: "BNB",
            active: true,
            explorer_url: "https://bscscan.com",
            default_rpc: Some("https://bsc-dataseed.binance.org"),
        });
        m.insert(CHAIN_BSC_TESTNET, ChainInfo {
            id: CHAIN_BSC_TESTNET,
            name: "BNB Smart Chain Testnet",
            native_symbol: "tBNB",
            active: true,
            explorer_url: "https://testnet.bscscan.com",
            default_rpc: Some("https://data-seed-prebsc-1-s1.binance.org:8545"),
        });
        m.insert(CHAIN_POLYGON, ChainInfo {
            id: CHAIN_POLYGON,
            name: "Polygon",
            native_symbol: "POL",
            active: false,
            explorer_url: "https://polygonscan.com",
            default_rpc: None,
        });
        m.insert(CHAIN_ARBITRUM, ChainInfo {
            id: CHAIN_ARBITRUM,
            name: "Arbitrum One",
            native_symbol: "ETH",
            active: false,
            explorer_url: "https://arbiscan.io",
            default_rpc: None,
        });
        m.insert(CHAIN_BASE, ChainInfo {
            id: CHAIN_BASE,
            name: "Base",
            native_symbol: "ETH",
            active: false,
            explorer_url: "https://basescan.org",
            default_rpc: None,
        });
        m
    };
}

pub fn chain_info(chain_id: u64) -> Option<&'static ChainInfo> {
    CHAINS.get(&chain_id)
}

pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAINS.contains(&chain_id)
}

/// Chains in the order the network picker lists them, active first.
pub fn advertised_chains() -> Vec<&'static ChainInfo> {
    let mut out: Vec<&ChainInfo> = CHAINS.values().collect();
    out.sort_by_key(|c| (!c.active, c.id));
    out
}

pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> String {
    let base = chain_info(chain_id)
        .map(|c| c.explorer_url)
        .unwrap_or("https://bscscan.com");
    format!("{base}/tx/{tx_hash}")
}

// =============================================================================
// TOKEN CONSTANTS
// =============================================================================

pub const BIT_DECIMALS: u8 = 9;
pub const STABLE_DECIMALS: u8 = 18;
pub const NATIVE_DECIMALS: u8 = 18;

/// Fraction digits shown for BIT and for every other token.
pub const BIT_DISPLAY_DIGITS: usize = 2;
pub const TOKEN_DISPLAY_DIGITS: usize = 4;

// Binance-Peg stablecoins on BSC mainnet (18 decimals).
pub const USDT_BSC: Address = address!("55d398326f99059fF775485246999027B3197955");
pub const USDC_BSC: Address = address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d");

pub fn default_usdt(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_BSC => Some(USDT_BSC),
        _ => None,
    }
}

pub fn default_usdc(chain_id: u64) -> Option<Address> {
    match chain_id {
        CHAIN_BSC => Some(USDC_BSC),
        _ => None,
    }
}

// =============================================================================
// EXPLORER FALLBACKS
// =============================================================================

pub const DEFAULT_HOLDER_COUNT: u64 = 1_250;
pub const DEFAULT_TRANSFER_COUNT: u64 = 4_800;

// =============================================================================
// POLLING
// =============================================================================

pub const FAST_POLL_SECS: u64 = 5;
pub const SLOW_POLL_SECS: u64 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bsc_networks_are_supported() {
        assert!(is_supported_chain(CHAIN_BSC));
        assert!(is_supported_chain(CHAIN_BSC_TESTNET));
        assert!(!is_supported_chain(CHAIN_POLYGON));
        assert!(!is_supported_chain(1));
    }

    #[test]
    fn advertised_chains_list_active_first() {
        let chains = advertised_chains();
        assert_eq!(chains.len(), 5);
        assert!(chains[0].active && chains[1].active);
        assert!(chains[2..].iter().all(|c| !c.active));
    }

    #[test]
    fn explorer_links_follow_chain() {
        assert_eq!(
            explorer_tx_url(CHAIN_BSC_TESTNET, "0x01"),
            "https://testnet.bscscan.com/tx/0x01"
        );
    }
}
