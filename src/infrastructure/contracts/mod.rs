// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

pub mod abi;
pub mod airdrop;
pub mod purchase;
pub mod shop;
pub mod staking;
pub mod tasks;
pub mod token;

use crate::app::config::ContractAddresses;
use crate::domain::constants::{BIT_DECIMALS, STABLE_DECIMALS};
use crate::domain::error::AppError;
use crate::network::provider::ChainProvider;
use alloy::network::Ethereum;
use alloy::primitives::B256;
use alloy::providers::PendingTransactionBuilder;
use serde::Serialize;

pub use airdrop::{AirdropClient, CheckInStatus};
pub use purchase::{PurchaseClient, Stablecoin};
pub use shop::{NewListing, ShopClient};
pub use staking::StakingClient;
pub use tasks::TasksClient;
pub use token::TokenClient;

/// Mined, successful transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Wait for a submitted call to be mined. No application-level timeout: the
/// provider's receipt polling decides how long this suspends.
pub(crate) async fn confirm(
    action: &str,
    sent: Result<PendingTransactionBuilder<Ethereum>, alloy::contract::Error>,
) -> Result<TxOutcome, AppError> {
    let pending = sent.map_err(|e| AppError::Transaction {
        hash: String::new(),
        reason: e.to_string(),
    })?;
    let hash = *pending.tx_hash();
    tracing::info!(target: "tx", action, tx = %hash, "Transaction submitted");

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: e.to_string(),
        })?;

    if !receipt.status() {
        tracing::warn!(target: "tx", action, tx = %hash, "Transaction reverted");
        return Err(AppError::Transaction {
            hash: format!("{hash:#x}"),
            reason: format!("{action} reverted on-chain"),
        });
    }

    tracing::info!(
        target: "tx",
        action,
        tx = %hash,
        block = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "Transaction confirmed"
    );
    Ok(TxOutcome {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    })
}

/// Every contract the dashboard talks to, bound to one provider.
/// Clients for unconfigured contracts are absent rather than failing startup.
#[derive(Clone)]
pub struct Contracts {
    pub bit: Option<TokenClient>,
    pub usdt: Option<TokenClient>,
    pub usdc: Option<TokenClient>,
    pub purchase: Option<PurchaseClient>,
    pub staking: Option<StakingClient>,
    pub airdrop: Option<AirdropClient>,
    pub tasks: Option<TasksClient>,
    pub shop: Option<ShopClient>,
}

impl Contracts {
    pub fn new(provider: ChainProvider, addresses: &ContractAddresses) -> Self {
        let token = |addr: Option<_>, symbol: &'static str, decimals: u8| {
            addr.map(|a| TokenClient::new(provider.clone(), a, symbol, decimals))
        };
        Self {
            bit: token(addresses.bit_token, "BIT", BIT_DECIMALS),
            usdt: token(addresses.usdt, "USDT", STABLE_DECIMALS),
            usdc: token(addresses.usdc, "USDC", STABLE_DECIMALS),
            purchase: addresses
                .token_purchase
                .map(|a| PurchaseClient::new(provider.clone(), a)),
            staking: addresses
                .staking
                .map(|a| StakingClient::new(provider.clone(), a)),
            airdrop: addresses
                .claim_airdrop
                .map(|a| AirdropClient::new(provider.clone(), a)),
            tasks: addresses
                .community_tasks
                .map(|a| TasksClient::new(provider.clone(), a)),
            shop: addresses
                .exchange_shop
                .map(|a| ShopClient::new(provider.clone(), a)),
        }
    }

    pub fn bit(&self) -> Result<&TokenClient, AppError> {
        self.bit
            .as_ref()
            .ok_or_else(|| missing("bit_token_address"))
    }

    pub fn stablecoin(&self, coin: Stablecoin) -> Result<&TokenClient, AppError> {
        match coin {
            Stablecoin::Usdt => self.usdt.as_ref().ok_or_else(|| missing("usdt_address")),
            Stablecoin::Usdc => self.usdc.as_ref().ok_or_else(|| missing("usdc_address")),
        }
    }

    pub fn purchase(&self) -> Result<&PurchaseClient, AppError> {
        self.purchase
            .as_ref()
            .ok_or_else(|| missing("token_purchase_address"))
    }

    pub fn staking(&self) -> Result<&StakingClient, AppError> {
        self.staking.as_ref().ok_or_else(|| missing("staking_address"))
    }

    pub fn airdrop(&self) -> Result<&AirdropClient, AppError> {
        self.airdrop
            .as_ref()
            .ok_or_else(|| missing("claim_airdrop_address"))
    }

    pub fn tasks(&self) -> Result<&TasksClient, AppError> {
        self.tasks
            .as_ref()
            .ok_or_else(|| missing("community_tasks_address"))
    }

    pub fn shop(&self) -> Result<&ShopClient, AppError> {
        self.shop
            .as_ref()
            .ok_or_else(|| missing("exchange_shop_address"))
    }
}

fn missing(key: &str) -> AppError {
    AppError::Config(format!("{} is missing", key.to_uppercase()))
}
