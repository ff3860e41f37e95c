// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::ttl_cache::TtlCache;
use crate::domain::constants::{DEFAULT_HOLDER_COUNT, DEFAULT_TRANSFER_COUNT};
use alloy::primitives::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const CACHE_TTL: Duration = Duration::from_secs(60);
/// BscScan caps `page * offset` at 10,000, so one page is all `tokentx` returns.
const TRANSFER_PAGE_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stat {
    Holders,
    Transfers,
}

/// BscScan envelope: `status` is "1" on success, `result` is a number string or a list.
#[derive(Deserialize, Debug)]
struct ExplorerEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

/// Token statistics shown on the dashboard. The `*_fallback` flags are set when
/// the figure is the configured constant rather than a live reading.
/// `transfers_capped` marks a live transfer count that filled the explorer's
/// single result window, so the real figure is at least `transfers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerStats {
    pub holders: u64,
    pub transfers: u64,
    pub holders_fallback: bool,
    pub transfers_fallback: bool,
    pub transfers_capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallbacks {
    pub holders: u64,
    pub transfers: u64,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            holders: DEFAULT_HOLDER_COUNT,
            transfers: DEFAULT_TRANSFER_COUNT,
        }
    }
}

#[derive(Clone)]
pub struct ExplorerClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    token: Option<Address>,
    fallbacks: Fallbacks,
    cache: Arc<TtlCache<Stat, u64>>,
}

impl ExplorerClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        token: Option<Address>,
        fallbacks: Fallbacks,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::Initialization(format!("Explorer client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            token,
            fallbacks,
            cache: Arc::new(TtlCache::new(CACHE_TTL)),
        })
    }

    /// Holder and transfer counts. Never fails: any explorer problem resolves
    /// to the fallback constant for that figure.
    pub async fn stats(&self) -> ExplorerStats {
        let (holders, transfers) = tokio::join!(
            self.resolve(Stat::Holders),
            self.resolve(Stat::Transfers)
        );
        ExplorerStats {
            holders: holders.unwrap_or(self.fallbacks.holders),
            transfers: transfers.unwrap_or(self.fallbacks.transfers),
            holders_fallback: holders.is_none(),
            transfers_fallback: transfers.is_none(),
            transfers_capped: transfers.is_some_and(|n| n >= u64::from(TRANSFER_PAGE_SIZE)),
        }
    }

    pub async fn holder_count(&self) -> u64 {
        self.resolve(Stat::Holders)
            .await
            .unwrap_or(self.fallbacks.holders)
    }

    pub async fn transfer_count(&self) -> u64 {
        self.resolve(Stat::Transfers)
            .await
            .unwrap_or(self.fallbacks.transfers)
    }

    async fn resolve(&self, stat: Stat) -> Option<u64> {
        if let Some(hit) = self.cache.get(&stat) {
            return Some(hit);
        }
        match self.fetch(stat).await {
            Ok(value) => {
                self.cache.insert(stat, value);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(target: "explorer", stat = ?stat, error = %e, "Using fallback count");
                None
            }
        }
    }

    async fn fetch(&self, stat: Stat) -> Result<u64, AppError> {
        let token = self
            .token
            .ok_or_else(|| AppError::Config("BIT_TOKEN_ADDRESS is missing".into()))?;
        let token = format!("{token:#x}");

        let mut query: Vec<(&str, String)> = match stat {
            Stat::Holders => vec![
                ("module", "token".into()),
                ("action", "tokenholdercount".into()),
                ("contractaddress", token),
            ],
            Stat::Transfers => vec![
                ("module", "account".into()),
                ("action", "tokentx".into()),
                ("contractaddress", token),
                ("page", "1".into()),
                ("offset", TRANSFER_PAGE_SIZE.to_string()),
                ("sort", "desc".into()),
            ],
        };
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("Explorer request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::ApiCall {
                provider: "explorer".into(),
                status: resp.status().as_u16(),
            });
        }

        let envelope: ExplorerEnvelope = resp.json().await.map_err(|_| AppError::ApiCall {
            provider: "explorer JSON".into(),
            status: 0,
        })?;
        parse_envelope(stat, envelope)
    }
}

fn parse_envelope(stat: Stat, envelope: ExplorerEnvelope) -> Result<u64, AppError> {
    if envelope.status != "1" {
        return Err(AppError::Connection(format!(
            "Explorer rejected {:?} query: {}",
            stat, envelope.message
        )));
    }
    let parsed = match (stat, &envelope.result) {
        (Stat::Holders, serde_json::Value::String(s)) => s.trim().parse().ok(),
        (Stat::Holders, serde_json::Value::Number(n)) => n.as_u64(),
        (Stat::Transfers, serde_json::Value::Array(list)) => Some(list.len() as u64),
        _ => None,
    };
    parsed.ok_or_else(|| AppError::Connection(format!("Unexpected explorer result for {:?}", stat)))
}
