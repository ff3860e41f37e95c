// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

pub mod constants;
pub mod countdown;
pub mod error;
pub mod shop;
pub mod staking;
pub mod task;
pub mod units;
