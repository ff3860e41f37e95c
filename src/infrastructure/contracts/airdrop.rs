// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::countdown::Countdown;
use crate::infrastructure::contracts::abi::IClaimAirdrop;
use crate::infrastructure::contracts::{TxOutcome, confirm};
use crate::network::provider::ChainProvider;
use alloy::primitives::{Address, U256};
use serde::Serialize;

/// Daily check-in state for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInStatus {
    pub last_check_in: Option<u64>,
    pub next_check_in: u64,
    pub reward: U256,
    pub claimable: U256,
}

impl CheckInStatus {
    pub fn derive(last: u64, interval: u64, reward: U256, claimable: U256) -> Self {
        let last_check_in = (last != 0).then_some(last);
        let next_check_in = last_check_in
            .map(|t| t.saturating_add(interval))
            .unwrap_or(0);
        Self {
            last_check_in,
            next_check_in,
            reward,
            claimable,
        }
    }

    pub fn can_check_in(&self, now: u64) -> bool {
        now >= self.next_check_in
    }

    pub fn countdown(&self, now: u64) -> Countdown {
        Countdown::until(self.next_check_in, now)
    }
}

#[derive(Clone)]
pub struct AirdropClient {
    provider: ChainProvider,
    address: Address,
}

impl AirdropClient {
    pub fn new(provider: ChainProvider, address: Address) -> Self {
        Self { provider, address }
    }

    fn contract(&self) -> IClaimAirdrop::IClaimAirdropInstance<ChainProvider> {
        IClaimAirdrop::new(self.address, self.provider.clone())
    }

    pub async fn status(&self, user: Address) -> Result<CheckInStatus, AppError> {
        let contract = self.contract();
        let (last, interval, reward, claimable) = retry_read(move |_| {
            let contract = contract.clone();
            async move {
                let last = contract.lastCheckIn(user).call().await?;
                let interval = contract.checkInInterval().call().await?;
                let reward = contract.checkInReward().call().await?;
                let claimable = contract.claimableBalance(user).call().await?;
                Ok::<_, alloy::contract::Error>((last, interval, reward, claimable))
            }
        })
        .await
        .map_err(|e| AppError::Connection(format!("Check-in status read failed: {}", e)))?;

        Ok(CheckInStatus::derive(
            u64::try_from(last).unwrap_or(u64::MAX),
            u64::try_from(interval).unwrap_or(u64::MAX),
            reward,
            claimable,
        ))
    }

    pub async fn check_in(&self) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm("checkIn", contract.checkIn().send().await).await
    }

    pub async fn claim(&self) -> Result<TxOutcome, AppError> {
        let contract = self.contract();
        confirm("claim", contract.claim().send().await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_check_in_is_immediately_available() {
        let status = CheckInStatus::derive(0, 86_400, U256::from(5u64), U256::ZERO);
        assert_eq!(status.last_check_in, None);
        assert!(status.can_check_in(1));
    }

    #[test]
    fn cooldown_counts_down_from_last_check_in() {
        let status = CheckInStatus::derive(1_000, 86_400, U256::from(5u64), U256::ZERO);
        assert!(!status.can_check_in(2_000));
        assert_eq!(status.countdown(2_000).total_secs(), 85_400);
        assert!(status.can_check_in(87_400));
    }
}
