// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::domain::countdown::Countdown;
use crate::domain::error::AppError;
use alloy::primitives::U256;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Fixed-term staking pools, indexed as the staking contract expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StakingTier {
    Days30,
    Days90,
    Days180,
    Days365,
}

impl StakingTier {
    pub const ALL: [StakingTier; 4] = [
        StakingTier::Days30,
        StakingTier::Days90,
        StakingTier::Days180,
        StakingTier::Days365,
    ];

    pub fn index(self) -> u8 {
        match self {
            StakingTier::Days30 => 0,
            StakingTier::Days90 => 1,
            StakingTier::Days180 => 2,
            StakingTier::Days365 => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn days(self) -> u64 {
        match self {
            StakingTier::Days30 => 30,
            StakingTier::Days90 => 90,
            StakingTier::Days180 => 180,
            StakingTier::Days365 => 365,
        }
    }

    pub fn from_days(days: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.days() == days)
    }
}

impl fmt::Display for StakingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

impl FromStr for StakingTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['d', 'D']);
        trimmed
            .parse::<u64>()
            .ok()
            .and_then(Self::from_days)
            .ok_or_else(|| AppError::validation("tier", format!("unknown staking term '{s}'")))
    }
}

/// Annual rate and lock length of a tier as configured on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierTerms {
    pub tier: StakingTier,
    pub apr_bps: u64,
    pub lock_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakePosition {
    pub index: u64,
    pub amount: U256,
    pub start: u64,
    pub unlock: u64,
    pub apr_bps: u64,
    pub withdrawn: bool,
}

/// Reward for holding `amount` over `term_secs` at `apr_bps`, simple interest.
pub fn projected_reward(amount: U256, apr_bps: u64, term_secs: u64) -> U256 {
    const YEAR_SECS: u64 = 365 * 86_400;
    amount * U256::from(apr_bps) * U256::from(term_secs) / U256::from(10_000u64 * YEAR_SECS)
}

impl StakePosition {
    pub fn is_unlocked(&self, now: u64) -> bool {
        now >= self.unlock
    }

    pub fn countdown(&self, now: u64) -> Countdown {
        Countdown::until(self.unlock, now)
    }

    pub fn projected_reward(&self) -> U256 {
        projected_reward(
            self.amount,
            self.apr_bps,
            self.unlock.saturating_sub(self.start),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constants::BIT_DECIMALS;
    use crate::domain::units::whole_tokens;

    #[test]
    fn tiers_parse_from_days() {
        assert_eq!("90".parse::<StakingTier>().unwrap(), StakingTier::Days90);
        assert_eq!("365d".parse::<StakingTier>().unwrap(), StakingTier::Days365);
        assert!("45".parse::<StakingTier>().is_err());
        assert_eq!(StakingTier::from_index(2), Some(StakingTier::Days180));
        assert_eq!(StakingTier::from_index(9), None);
    }

    #[test]
    fn full_year_at_twelve_percent() {
        let position = StakePosition {
            index: 0,
            amount: whole_tokens(1_000, BIT_DECIMALS),
            start: 0,
            unlock: 365 * 86_400,
            apr_bps: 1_200,
            withdrawn: false,
        };
        assert_eq!(position.projected_reward(), whole_tokens(120, BIT_DECIMALS));
        assert!(!position.is_unlocked(100));
        assert!(position.is_unlocked(365 * 86_400));
        assert_eq!(position.countdown(365 * 86_400 - 60).total_secs(), 60);
    }
}
