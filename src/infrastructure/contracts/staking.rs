// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::staking::{StakePosition, StakingTier, TierTerms};
use crate::infrastructure::contracts::abi::IStaking;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[derive(Clone)]
pub struct StakingClient {
    provider: ChainProvider,
    address: Address,
}

impl StakingClient {
    pub fn new(provider: ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    /// Spender the BIT approval must be granted to.
    pub fn address(&self) -> Address {
        self.address
    }

    fn contract(&self) -> IStaking::IStakingInstance<ChainProvider> {
        IStaking::new(self.address, self.provider.clone())
    }

    pub async fn tier_terms(&self, tier: StakingTier) -> Result<TierTerms, AppError> {
        let contract = self.contract();
        let index = tier.index();
        let terms = retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getTier(index).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Tier {} read failed: {}", tier, e)))?;

        Ok(TierTerms {
            tier,
            apr_bps: to_u64(terms.aprBps),
            lock_secs: to_u64(terms.lockDuration),
        })
    }

    pub async fn all_tiers(&self) -> Result<Vec<TierTerms>, AppError> {
        let mut out = Vec::with_capacity(StakingTier::ALL.len());
        for tier in StakingTier::ALL {
            out.push(self.tier_terms(tier).await?);
        }
        Ok(out)
    }

    pub async fn user_stakes(&self, user: Address) -> Result<Vec<StakePosition>, AppError> {
        let contract = self.contract();
        let stakes = retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.getUserStakes(user).call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Stake list read failed: {}", e)))?;

        Ok(stakes
            .into_iter()
            .enumerate()
            .map(|(index, s)| StakePosition {
                index: index as u64,
                amount: s.amount,
                start: to_u64(s.startTime),
                unlock: to_u64(s.unlockTime),
                apr_bps: to_u64(s.aprBps),
                withdrawn: s.withdrawn,
            })
            .collect())
    }

    pub async fn total_staked(&self) -> Result<U256, AppError> {
        let contract = self.contract();
        retry_read(move |_| {
            let contract = contract.clone();
            async move { contract.totalStaked().call().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Total staked read failed: {}", e)))
    }

    /// Lock `amount` BIT in `tier`. The caller checks the allowance first.
    pub async fn stake(&self, amount: U256, tier: StakingTier) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm("stake", contract.stake(amount, tier.index()).send().await).await
    }

    pub async fn unstake(&self, stake_index: u64) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm(
            "unstake",
            contract.unstake(U256::from(stake_index)).send().await,
        )
        .await
    }
}
