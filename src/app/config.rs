// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::data_path::resolve_data_path;
use crate::domain::constants::{self, DEFAULT_HOLDER_COUNT, DEFAULT_TRANSFER_COUNT};
use crate::domain::error::AppError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_false")]
    pub debug: bool,
    #[serde(default = "default_false")]
    pub log_json: bool,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    pub http_providers: Option<HashMap<String, String>>,
    pub data_dir: Option<String>,

    // Identity (only needed for writes)
    pub wallet_key: Option<String>,

    // Contracts
    pub bit_token_address: Option<Address>,
    pub token_purchase_address: Option<Address>,
    pub staking_address: Option<Address>,
    pub exchange_shop_address: Option<Address>,
    pub claim_airdrop_address: Option<Address>,
    pub community_tasks_address: Option<Address>,
    pub usdt_address: Option<Address>,
    pub usdc_address: Option<Address>,

    // Block explorer
    #[serde(default = "default_explorer_api_url")]
    pub explorer_api_url: String,
    pub explorer_api_key: Option<String>,
    #[serde(default = "default_holders_fallback")]
    pub holders_fallback: u64,
    #[serde(default = "default_transfers_fallback")]
    pub transfers_fallback: u64,

    // Polling
    #[serde(default = "default_fast_poll_secs")]
    pub fast_poll_secs: u64,
    #[serde(default = "default_slow_poll_secs")]
    pub slow_poll_secs: u64,

    // Backend
    #[serde(default = "default_server_bind")]
    pub server_bind: String,
    pub public_base_url: Option<String>,
    pub upload_dir: Option<String>,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Endpoint of `send-whatsapp-order`; when unset the link is built locally.
    pub order_notify_url: Option<String>,
}

// Defaults
fn default_false() -> bool {
    false
}
fn default_chain_id() -> u64 {
    constants::CHAIN_BSC
}
fn default_explorer_api_url() -> String {
    "https://api.bscscan.com/api".to_string()
}
fn default_holders_fallback() -> u64 {
    DEFAULT_HOLDER_COUNT
}
fn default_transfers_fallback() -> u64 {
    DEFAULT_TRANSFER_COUNT
}
fn default_fast_poll_secs() -> u64 {
    constants::FAST_POLL_SECS
}
fn default_slow_poll_secs() -> u64 {
    constants::SLOW_POLL_SECS
}
fn default_server_bind() -> String {
    "0.0.0.0:8787".to_string()
}
fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

/// Resolved contract addresses for the active chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractAddresses {
    pub bit_token: Option<Address>,
    pub token_purchase: Option<Address>,
    pub staking: Option<Address>,
    pub exchange_shop: Option<Address>,
    pub claim_airdrop: Option<Address>,
    pub community_tasks: Option<Address>,
    pub usdt: Option<Address>,
    pub usdc: Option<Address>,
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = path {
            builder = builder.add_source(File::from(Path::new(selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;

        if !constants::is_supported_chain(settings.chain_id) {
            return Err(AppError::Config(format!(
                "chain_id {} is not supported (expected one of {:?})",
                settings.chain_id,
                constants::SUPPORTED_CHAINS
            )));
        }

        Ok(settings)
    }

    /// RPC URL for a chain: explicit map, then `http_provider_<id>` /
    /// `http_provider` env, then the chain's public endpoint.
    pub fn get_http_provider(&self, chain_id: u64) -> Result<String, AppError> {
        if let Some(urls) = &self.http_providers
            && let Some(url) = urls.get(&chain_id.to_string())
        {
            return Ok(url.clone());
        }

        let candidates = [
            format!("http_provider_{}", chain_id),
            "http_provider".to_string(),
        ];
        for key in candidates {
            if let Ok(v) = std::env::var(&key) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Ok(trimmed.to_string());
                }
            }
        }

        constants::chain_info(chain_id)
            .and_then(|c| c.default_rpc)
            .map(ToString::to_string)
            .ok_or_else(|| AppError::Config(format!("No RPC URL found for chain {}", chain_id)))
    }

    pub fn wallet_key_value(&self) -> Option<String> {
        for key in ["WALLET_KEY", "PRIVATE_KEY"] {
            if let Ok(v) = std::env::var(key)
                && !v.trim().is_empty()
            {
                return Some(v.trim().to_string());
            }
        }
        self.wallet_key
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn contract_addresses(&self) -> ContractAddresses {
        ContractAddresses {
            bit_token: self.bit_token_address,
            token_purchase: self.token_purchase_address,
            staking: self.staking_address,
            exchange_shop: self.exchange_shop_address,
            claim_airdrop: self.claim_airdrop_address,
            community_tasks: self.community_tasks_address,
            usdt: self
                .usdt_address
                .or_else(|| constants::default_usdt(self.chain_id)),
            usdc: self
                .usdc_address
                .or_else(|| constants::default_usdc(self.chain_id)),
        }
    }

    pub fn explorer_api_key_value(&self) -> Option<String> {
        for key in ["BSCSCAN_API_KEY", "EXPLORER_API_KEY"] {
            if let Ok(v) = std::env::var(key)
                && !v.trim().is_empty()
            {
                return Some(v);
            }
        }
        self.explorer_api_key.clone()
    }

    pub fn fast_poll_interval(&self) -> Duration {
        Duration::from_secs(self.fast_poll_secs.max(1))
    }

    pub fn slow_poll_interval(&self) -> Duration {
        Duration::from_secs(self.slow_poll_secs.max(self.fast_poll_secs).max(1))
    }

    pub fn upload_dir_path(&self) -> PathBuf {
        let raw = self.upload_dir.as_deref().unwrap_or("data/uploads");
        resolve_data_path(raw, self.data_dir.as_deref())
    }

    /// Base URL public object links are built from.
    pub fn public_base_url_value(&self) -> String {
        if let Some(url) = self
            .public_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return url.trim_end_matches('/').to_string();
        }
        let port = self
            .server_bind
            .rsplit_once(':')
            .map(|(_, p)| p)
            .unwrap_or("8787");
        format!("http://localhost:{port}")
    }

    pub fn order_notify_url_value(&self) -> Option<String> {
        std::env::var("ORDER_NOTIFY_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.order_notify_url.clone())
    }
}
