// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use alloy::network::{Ethereum, EthereumWallet};
use alloy::providers::{DynProvider, Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;
/// Provider handed to contract clients; wallet-backed when a key is configured.
pub type ChainProvider = DynProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }

    /// Read-only provider; write calls through it fail at signing.
    pub fn read_only(rpc_url: &str) -> Result<ChainProvider, AppError> {
        Ok(Self::http(rpc_url)?.erased())
    }

    pub fn signer(wallet_key: &str) -> Result<PrivateKeySigner, AppError> {
        PrivateKeySigner::from_str(wallet_key.trim())
            .map_err(|e| AppError::Config(format!("Invalid wallet key: {}", e)))
    }

    pub fn with_wallet(rpc_url: &str, signer: PrivateKeySigner) -> Result<ChainProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);
        Ok(provider.erased())
    }
}
