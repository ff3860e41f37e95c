// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::domain::shop::Item;
use crate::infrastructure::contracts::{ShopClient, TokenClient, TxOutcome};
use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

/// Evidence that the shop may pull `amount` BIT. `tx_hash` is `None` when an
/// existing allowance already covered the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub tx_hash: Option<B256>,
    pub amount: U256,
}

impl Approval {
    pub fn is_reused(&self) -> bool {
        self.tx_hash.is_none()
    }
}

/// On-chain side of the exchange flow.
#[async_trait]
pub trait ShopGateway: Send + Sync {
    async fn approve(&self, owner: Address, item: &Item) -> Result<Approval, AppError>;

    async fn exchange_item(&self, owner: Address, item: &Item) -> Result<TxOutcome, AppError>;
}

/// Gateway backed by the BIT token and Exchange Shop contracts.
#[derive(Clone)]
pub struct ChainShopGateway {
    bit: TokenClient,
    shop: ShopClient,
}

impl ChainShopGateway {
    pub fn new(bit: TokenClient, shop: ShopClient) -> Self {
        Self { bit, shop }
    }
}

#[async_trait]
impl ShopGateway for ChainShopGateway {
    async fn approve(&self, owner: Address, item: &Item) -> Result<Approval, AppError> {
        let spender = self.shop.address();
        let current = self.bit.allowance(owner, spender).await?;
        if current >= item.price {
            tracing::info!(target: "exchange", item = item.id, "Existing allowance covers price");
            return Ok(Approval {
                tx_hash: None,
                amount: current,
            });
        }
        let outcome = self.bit.approve(spender, item.price).await?;
        Ok(Approval {
            tx_hash: Some(outcome.tx_hash),
            amount: item.price,
        })
    }

    async fn exchange_item(&self, owner: Address, item: &Item) -> Result<TxOutcome, AppError> {
        self.bit
            .ensure_allowance(owner, self.shop.address(), item.price)
            .await?;
        self.bit.ensure_balance(owner, item.price).await?;
        self.shop.exchange_item(item.id).await
    }
}
