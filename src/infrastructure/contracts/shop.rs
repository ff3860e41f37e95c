// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::shop::{Catalog, Item};
use crate::infrastructure::contracts::abi::IExchangeShop;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};

impl From<IExchangeShop::Item> for Item {
    fn from(raw: IExchangeShop::Item) -> Self {
        Item {
            id: u64::try_from(raw.id).unwrap_or(u64::MAX),
            name: raw.name,
            description: raw.description,
            price: raw.price,
            merchant: raw.merchant,
            stock: u64::try_from(raw.stock).unwrap_or(u64::MAX),
            active: raw.active,
            category: raw.category,
            image_url: raw.imageUrl,
            merchant_whatsapp: raw.merchantWhatsApp,
        }
    }
}

/// Merchant listing request. `price` is already in BIT units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub price: U256,
    pub stock: u64,
    pub category: String,
    pub image_url: String,
    pub merchant_whatsapp: String,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("name", "is required"));
        }
        if self.price.is_zero() {
            return Err(AppError::validation("price", "must be greater than zero"));
        }
        if self.stock == 0 {
            return Err(AppError::validation("stock", "must be at least 1"));
        }
        let digits = crate::common::parsing::digits_only(&self.merchant_whatsapp);
        if digits.len() < 7 {
            return Err(AppError::validation(
                "merchantWhatsApp",
                "must contain a full international number",
            ));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ShopClient {
    provider: ChainProvider,
    address: Address,
}

impl ShopClient {
    pub fn new(provider: ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    /// Spender the BIT approval must be granted to.
    pub fn address(&self) -> Address {
        self.address
    }

    fn contract(&self) -> IExchangeShop::IExchangeShopInstance<ChainProvider> {
        IExchangeShop::new(self.address, self.provider.clone())
    }

    pub async fn items(&self) -> Result<Catalog, AppError> {
        let contract = self.contract();
        let raw = retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getAllItems().call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Shop items read failed: {}", e)))?;

        Ok(Catalog::new(raw.into_iter().map(Item::from).collect()))
    }

    pub async fn item(&self, id: u64) -> Result<Item, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getItem(U256::from(id)).call().await }
        })
        .await
        .map(Item::from)
        .map_err(|e| AppError::Connection(format!("Shop item {} read failed: {}", id, e)))
    }

    /// Spend the item price in BIT. Allowance must already cover it.
    pub async fn exchange_item(&self, id: u64) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm(
            "exchangeItem",
            contract.exchangeItem(U256::from(id)).send().await,
        )
        .await
    }

    pub async fn list_item(&self, listing: NewListing) -> Result<TxOutcome, AppError> {
        listing.validate()?;
        let contract = self.contract();
        confirm(
            "listItem",
            contract
                .listItem(
                    listing.name,
                    listing.description,
                    listing.price,
                    U256::from(listing.stock),
                    listing.category,
                    listing.image_url,
                    listing.merchant_whatsapp,
                )
                .send()
                .await,
        )
        .await
    }
}
