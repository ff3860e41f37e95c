// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function totalSupply() external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface ITokenPurchase {
        /// USD price of one BIT, 18 decimals.
        function getBitPrice() external view returns (uint256);
        function saleActive() external view returns (bool);
        function totalSold() external view returns (uint256);

        function buyWithUSDT(uint256 usdtAmount) external;
        function buyWithUSDC(uint256 usdcAmount) external;
        function buyWithBNB() external payable;

        event TokensPurchased(address indexed buyer, address indexed payToken, uint256 paid, uint256 bitAmount);
    }
}

sol! {
    #[sol(rpc)]
    interface IStaking {
        struct StakeInfo {
            uint256 amount;
            uint256 startTime;
            uint256 unlockTime;
            uint256 aprBps;
            bool withdrawn;
        }

        function getTier(uint8 tier) external view returns (uint256 lockDuration, uint256 aprBps);
        function getUserStakes(address user) external view returns (StakeInfo[] memory);
        function totalStaked() external view returns (uint256);

        function stake(uint256 amount, uint8 tier) external;
        function unstake(uint256 stakeIndex) external;

        event Staked(address indexed user, uint256 amount, uint8 tier);
        event Unstaked(address indexed user, uint256 stakeIndex, uint256 amount, uint256 reward);
    }
}

sol! {
    #[sol(rpc)]
    interface IClaimAirdrop {
        function lastCheckIn(address user) external view returns (uint256);
        function checkInInterval() external view returns (uint256);
        function checkInReward() external view returns (uint256);
        function claimableBalance(address user) external view returns (uint256);

        function checkIn() external;
        function claim() external;

        event CheckedIn(address indexed user, uint256 reward);
        event Claimed(address indexed user, uint256 amount);
    }
}

sol! {
    #[sol(rpc)]
    interface ICommunityTasks {
        function taskCount() external view returns (uint256);
        function getTaskInfo(uint256 taskId) external view returns (
            string memory title,
            string memory description,
            uint256 reward,
            string memory category,
            uint256 activationDate,
            bool active
        );
        function getUserTaskInfo(address user, uint256 taskId) external view returns (
            bool completed,
            uint256 unlockTime,
            bool linkVisited
        );

        function visitLink(uint256 taskId) external;
        function completeTask(uint256 taskId) external;

        event TaskCompleted(address indexed user, uint256 indexed taskId, uint256 reward);
    }
}

sol! {
    #[sol(rpc)]
    interface IExchangeShop {
        struct Item {
            uint256 id;
            string name;
            string description;
            uint256 price;
            address merchant;
            uint256 stock;
            bool active;
            string category;
            string imageUrl;
            string merchantWhatsApp;
        }

        function getAllItems() external view returns (Item[] memory);
        function getItem(uint256 itemId) external view returns (Item memory);

        function exchangeItem(uint256 itemId) external;
        function listItem(
            string calldata name,
            string calldata description,
            uint256 price,
            uint256 stock,
            string calldata category,
            string calldata imageUrl,
            string calldata merchantWhatsApp
        ) external;

        event ItemExchanged(uint256 indexed itemId, address indexed buyer, address indexed merchant, uint256 price);
        event ItemListed(uint256 indexed itemId, address indexed merchant, uint256 price);

        error ItemNotActive(uint256 itemId);
        error OutOfStock(uint256 itemId);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn erc20_selectors_match_standard() {
        let approve = IERC20::approveCall {
            spender: Address::ZERO,
            amount: U256::ZERO,
        }
        .abi_encode();
        let allowance = IERC20::allowanceCall {
            owner: Address::ZERO,
            spender: Address::ZERO,
        }
        .abi_encode();
        assert_eq!(hex::encode(&approve[..4]), "095ea7b3");
        assert_eq!(hex::encode(&allowance[..4]), "dd62ed3e");
    }

    #[test]
    fn exchange_item_call_roundtrips() {
        let call = IExchangeShop::exchangeItemCall {
            itemId: U256::from(42u64),
        };
        let encoded = call.abi_encode();
        let decoded =
            IExchangeShop::exchangeItemCall::abi_decode(&encoded).expect("decode exchange call");
        assert_eq!(decoded.itemId, U256::from(42u64));
    }
}
