// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

//! Exchange Shop purchase flow: approve, shipping, exchange, receipt.

pub mod gateway;
pub mod workflow;

pub use gateway::{Approval, ChainShopGateway, ShopGateway};
pub use workflow::{ExchangeContext, ExchangeStep, ExchangeWorkflow, OrderReceipt};
