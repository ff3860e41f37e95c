// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::constants::explorer_tx_url;
use crate::common::error::AppError;
use crate::domain::shop::{Item, ShippingInfo};
use crate::services::exchange::gateway::{Approval, ShopGateway};
use crate::services::notify::{OrderDetails, OrderNotifier};
use crate::services::session::{NetworkGate, NetworkSwitcher, WalletSession};
use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use std::sync::Arc;

/// Terminal record of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub item_id: u64,
    pub item_name: String,
    pub price: U256,
    pub display_price: String,
    pub tx_hash: B256,
    pub explorer_url: String,
    pub whatsapp_url: Option<String>,
    /// Set when the merchant notification could not be prepared.
    pub notify_error: Option<String>,
}

/// Where the flow stands. Each variant carries what the earlier steps produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeStep {
    Approve,
    Shipping {
        approval: Approval,
    },
    Exchange {
        approval: Approval,
        shipping: ShippingInfo,
    },
    Receipt(OrderReceipt),
}

impl ExchangeStep {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeStep::Approve => "approve",
            ExchangeStep::Shipping { .. } => "shipping",
            ExchangeStep::Exchange { .. } => "exchange",
            ExchangeStep::Receipt(_) => "receipt",
        }
    }
}

/// Collaborators shared by every exchange in a session.
#[derive(Clone)]
pub struct ExchangeContext {
    pub gateway: Arc<dyn ShopGateway>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub session: Arc<WalletSession>,
    pub switcher: Arc<dyn NetworkSwitcher>,
    pub gate: NetworkGate,
}

pub struct ExchangeWorkflow {
    item: Item,
    step: ExchangeStep,
    ctx: ExchangeContext,
}

fn out_of_order(action: &str, step: &ExchangeStep) -> AppError {
    AppError::Workflow(format!("cannot {action} during the {} step", step.name()))
}

impl ExchangeWorkflow {
    pub fn new(item: Item, ctx: ExchangeContext) -> Result<Self, AppError> {
        if !item.is_available() {
            return Err(AppError::Workflow(format!(
                "item {} is not available for exchange",
                item.id
            )));
        }
        Ok(Self {
            item,
            step: ExchangeStep::Approve,
            ctx,
        })
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn step(&self) -> &ExchangeStep {
        &self.step
    }

    pub fn receipt(&self) -> Option<&OrderReceipt> {
        match &self.step {
            ExchangeStep::Receipt(r) => Some(r),
            _ => None,
        }
    }

    async fn preflight(&self) -> Result<Address, AppError> {
        self.ctx
            .gate
            .preflight(&self.ctx.session, self.ctx.switcher.as_ref())
            .await
    }

    /// Step 1: authorize the shop to pull the item price.
    pub async fn approve(&mut self) -> Result<&ExchangeStep, AppError> {
        if !matches!(self.step, ExchangeStep::Approve) {
            return Err(out_of_order("approve", &self.step));
        }
        let owner = self.preflight().await?;
        let approval = self.ctx.gateway.approve(owner, &self.item).await?;
        if approval.amount < self.item.price {
            return Err(AppError::InsufficientAllowance {
                required: self.item.price.to_string(),
                available: approval.amount.to_string(),
            });
        }
        tracing::info!(
            target: "exchange",
            item = self.item.id,
            reused = approval.is_reused(),
            "Approval granted"
        );
        self.step = ExchangeStep::Shipping { approval };
        Ok(&self.step)
    }

    /// Step 2: collect delivery details. A validation failure keeps the step.
    pub fn submit_shipping(&mut self, shipping: ShippingInfo) -> Result<&ExchangeStep, AppError> {
        let ExchangeStep::Shipping { approval } = &self.step else {
            return Err(out_of_order("submit shipping", &self.step));
        };
        let approval = *approval;
        shipping.validate()?;
        self.step = ExchangeStep::Exchange { approval, shipping };
        Ok(&self.step)
    }

    /// Step 3: spend the BIT. The merchant notification is best-effort and never
    /// fails this step once the exchange is mined.
    pub async fn exchange(&mut self) -> Result<OrderReceipt, AppError> {
        let ExchangeStep::Exchange { shipping, .. } = &self.step else {
            return Err(out_of_order("exchange", &self.step));
        };
        let shipping = shipping.clone();

        let owner = self.preflight().await?;
        let outcome = self.ctx.gateway.exchange_item(owner, &self.item).await?;
        if outcome.tx_hash == B256::ZERO {
            return Err(AppError::Transaction {
                hash: String::new(),
                reason: "exchange returned no transaction hash".into(),
            });
        }

        let hash = format!("{:#x}", outcome.tx_hash);
        let chain_id = self
            .ctx
            .session
            .state()
            .chain_id
            .unwrap_or(self.ctx.gate.target_chain());
        let (whatsapp_url, notify_error) = self.notify(&hash, shipping).await;

        let receipt = OrderReceipt {
            item_id: self.item.id,
            item_name: self.item.name.clone(),
            price: self.item.price,
            display_price: self.item.display_price(),
            tx_hash: outcome.tx_hash,
            explorer_url: explorer_tx_url(chain_id, &hash),
            whatsapp_url,
            notify_error,
        };
        tracing::info!(target: "exchange", item = self.item.id, tx = %hash, "Exchange complete");
        self.step = ExchangeStep::Receipt(receipt.clone());
        Ok(receipt)
    }

    async fn notify(&self, tx_hash: &str, shipping: ShippingInfo) -> (Option<String>, Option<String>) {
        if self.item.merchant_whatsapp.trim().is_empty() {
            tracing::warn!(target: "exchange", item = self.item.id, "Merchant has no WhatsApp number");
            return (None, Some("merchant has no WhatsApp number".into()));
        }
        let order = OrderDetails {
            merchant_whatsapp: self.item.merchant_whatsapp.clone(),
            item_name: self.item.name.clone(),
            item_price: self.item.display_price(),
            shipping_info: shipping,
            tx_hash: tx_hash.to_string(),
        };
        match self.ctx.notifier.notify(&order).await {
            Ok(url) => (Some(url), None),
            Err(e) => {
                tracing::warn!(target: "exchange", item = self.item.id, error = %e, "Order notification failed");
                (None, Some(e.user_message()))
            }
        }
    }

    /// Back to the first step. A granted approval stays valid on-chain.
    pub fn reset(&mut self) {
        self.step = ExchangeStep::Approve;
    }
}
