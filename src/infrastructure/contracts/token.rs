// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::units::format_units;
use crate::infrastructure::contracts::abi::IERC20;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;

/// ERC-20 token with its display metadata (BIT, USDT, USDC).
#[derive(Clone)]
pub struct TokenClient {
    provider: ChainProvider,
    address: Address,
    symbol: &'static str,
    decimals: u8,
}

impl TokenClient {
    pub fn new(
        provider: ChainProvider,
        address: Address,
        symbol: &'static str,
        decimals: u8,
    ) -> Self {
        Self {
            provider,
            address,
            symbol,
            decimals,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, AppError> {
        let contract = IERC20::new(self.address, self.provider.clone());
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.balanceOf(owner).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("{} balance failed: {}", self.symbol, e)))
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, AppError> {
        let contract = IERC20::new(self.address, self.provider.clone());
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.allowance(owner, spender).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("{} allowance failed: {}", self.symbol, e)))
    }

    /// Block a spend the spender is not yet approved for.
    pub async fn ensure_allowance(
        &self,
        owner: Address,
        spender: Address,
        required: U256,
    ) -> Result<(), AppError> {
        let approved = self.allowance(owner, spender).await?;
        if approved < required {
            return Err(AppError::InsufficientAllowance {
                required: format!("{} {}", format_units(required, self.decimals), self.symbol),
                available: format!("{} {}", format_units(approved, self.decimals), self.symbol),
            });
        }
        Ok(())
    }

    pub async fn ensure_balance(&self, owner: Address, required: U256) -> Result<(), AppError> {
        let balance = self.balance_of(owner).await?;
        if balance < required {
            return Err(AppError::InsufficientFunds {
                required: format!("{} {}", format_units(required, self.decimals), self.symbol),
                available: format!("{} {}", format_units(balance, self.decimals), self.symbol),
            });
        }
        Ok(())
    }

    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TxOutcome, AppError> {
        tracing::info!(
            target: "tx",
            token = self.symbol,
            spender = %spender,
            amount = %format_units(amount, self.decimals),
            "Approving spend"
        );
        let contract = IERC20::new(self.address, self.provider.clone());
        confirm("approve", contract.approve(spender, amount).send().await).await
    }
}

/// Native coin balance (BNB).
pub async fn native_balance(provider: &ChainProvider, owner: Address) -> Result<U256, AppError> {
    let provider = provider.clone();
    retry_read(move |_| {
        let provider = provider.clone();
        async move { provider.get_balance(owner).await }
    })
    .await
    .map_err(|e| AppError::Connection(format!("Balance check failed: {}", e)))
}
