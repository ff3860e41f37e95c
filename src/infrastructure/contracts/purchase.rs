// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::infrastructure::contracts::abi::ITokenPurchase;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stablecoin {
    Usdt,
    Usdc,
}

impl fmt::Display for Stablecoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stablecoin::Usdt => f.write_str("USDT"),
            Stablecoin::Usdc => f.write_str("USDC"),
        }
    }
}

impl FromStr for Stablecoin {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usdt" => Ok(Stablecoin::Usdt),
            "usdc" => Ok(Stablecoin::Usdc),
            other => Err(AppError::validation(
                "payToken",
                format!("'{other}' is not USDT or USDC"),
            )),
        }
    }
}

/// Token purchase (presale) contract.
#[derive(Clone)]
pub struct PurchaseClient {
    provider: ChainProvider,
    address: Address,
}

impl PurchaseClient {
    pub fn new(provider: ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn contract(&self) -> ITokenPurchase::ITokenPurchaseInstance<ChainProvider> {
        ITokenPurchase::new(self.address, self.provider.clone())
    }

    /// USD price of one BIT, 18 decimals.
    pub async fn bit_price(&self) -> Result<U256, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getBitPrice().call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("BIT price read failed: {}", e)))
    }

    pub async fn sale_active(&self) -> Result<bool, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.saleActive().call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Sale status read failed: {}", e)))
    }

    pub async fn total_sold(&self) -> Result<U256, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.totalSold().call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Total sold read failed: {}", e)))
    }

    /// Pay with a stablecoin. The caller checks the allowance first.
    pub async fn buy_with_stable(
        &self,
        coin: Stablecoin,
        amount: U256,
    ) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        match coin {
            Stablecoin::Usdt => confirm("buyWithUSDT", contract.buyWithUSDT(amount).send().await).await,
            Stablecoin::Usdc => confirm("buyWithUSDC", contract.buyWithUSDC(amount).send().await).await,
        }
    }

    pub async fn buy_with_bnb(&self, value: U256) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm("buyWithBNB", contract.buyWithBNB().value(value).send().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stablecoin_parses_case_insensitively() {
        assert_eq!("USDT".parse::<Stablecoin>().unwrap(), Stablecoin::Usdt);
        assert_eq!(" usdc ".parse::<Stablecoin>().unwrap(), Stablecoin::Usdc);
        assert!("busd".parse::<Stablecoin>().is_err());
        assert_eq!(Stablecoin::Usdc.to_string(), "USDC");
    }
}
