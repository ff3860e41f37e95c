// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

//! Order notification sent to the merchant after an exchange is mined.
//!
//! The message is a plain WhatsApp text; delivery is a `wa.me` deep link the
//! buyer opens, so nothing is stored server-side.

use crate::common::error::AppError;
use crate::common::parsing::digits_only;
use crate::domain::shop::ShippingInfo;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

const MIN_PHONE_DIGITS: usize = 7;

/// Body of `send-whatsapp-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(rename = "merchantWhatsApp")]
    pub merchant_whatsapp: String,
    pub item_name: String,
    pub item_price: String,
    pub shipping_info: ShippingInfo,
    pub tx_hash: String,
}

impl OrderDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        if digits_only(&self.merchant_whatsapp).len() < MIN_PHONE_DIGITS {
            return Err(AppError::validation(
                "merchantWhatsApp",
                "must contain a full international number",
            ));
        }
        if self.item_name.trim().is_empty() {
            return Err(AppError::validation("itemName", "is required"));
        }
        if self.tx_hash.trim().is_empty() {
            return Err(AppError::validation("txHash", "is required"));
        }
        self.shipping_info.validate()
    }
}

/// Reply of `send-whatsapp-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderResponse {
    pub fn ok(whatsapp_url: String) -> Self {
        Self {
            success: true,
            whatsapp_url: Some(whatsapp_url),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            whatsapp_url: None,
            error: Some(error.into()),
        }
    }
}

pub fn order_message(order: &OrderDetails) -> String {
    let s = &order.shipping_info;
    let mut msg = String::new();
    let _ = writeln!(msg, "*New BIT Access order*");
    let _ = writeln!(msg);
    let _ = writeln!(msg, "Item: {}", order.item_name.trim());
    let _ = writeln!(msg, "Price: {}", order.item_price.trim());
    let _ = writeln!(msg, "Transaction: {}", order.tx_hash.trim());
    let _ = writeln!(msg);
    let _ = writeln!(msg, "*Ship to*");
    let _ = writeln!(msg, "Name: {}", s.full_name.trim());
    let _ = writeln!(msg, "Email: {}", s.email.trim());
    let _ = writeln!(msg, "Phone: {}", s.phone_number.trim());
    let _ = writeln!(
        msg,
        "Address: {}, {}, {} {}",
        s.city.trim(),
        s.state.trim(),
        s.country.trim(),
        s.zip_code.trim()
    );
    if let Some(landmark) = s.landmark() {
        let _ = writeln!(msg, "Landmark: {}", landmark);
    }
    let _ = writeln!(msg);
    let _ = write!(
        msg,
        "Placed: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    msg
}

/// `https://wa.me/<digits>?text=<encoded>` for the merchant's number.
pub fn whatsapp_url(number: &str, message: &str) -> Result<String, AppError> {
    let digits = digits_only(number);
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(AppError::validation(
            "merchantWhatsApp",
            "must contain a full international number",
        ));
    }
    let text: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Ok(format!("https://wa.me/{digits}?text={text}"))
}

/// Validate and build the deep link for an order.
pub fn build_order_link(order: &OrderDetails) -> Result<String, AppError> {
    order.validate()?;
    whatsapp_url(&order.merchant_whatsapp, &order_message(order))
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Returns the link the buyer should open to hand the order to the merchant.
    async fn notify(&self, order: &OrderDetails) -> Result<String, AppError>;
}

/// Posts to the `send-whatsapp-order` backend when an endpoint is configured,
/// otherwise builds the link in-process.
#[derive(Clone)]
pub struct WhatsAppOrderNotifier {
    client: Client,
    endpoint: Option<String>,
}

impl WhatsAppOrderNotifier {
    pub fn new(endpoint: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Initialization(format!("Notify client: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    pub fn local() -> Result<Self, AppError> {
        Self::new(None)
    }
}

#[async_trait]
impl OrderNotifier for WhatsAppOrderNotifier {
    async fn notify(&self, order: &OrderDetails) -> Result<String, AppError> {
        let Some(endpoint) = &self.endpoint else {
            return build_order_link(order);
        };

        let resp = self
            .client
            .post(endpoint)
            .json(order)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("Order notification failed: {}", e)))?;
        let status = resp.status().as_u16();
        let body: OrderResponse = resp.json().await.map_err(|_| AppError::ApiCall {
            provider: "send-whatsapp-order".into(),
            status,
        })?;

        match (body.success, body.whatsapp_url) {
            (true, Some(url)) => Ok(url),
            _ => Err(AppError::ApiCall {
                provider: format!(
                    "send-whatsapp-order ({})",
                    body.error.unwrap_or_else(|| "no link returned".into())
                ),
                status,
            }),
        }
    }
}
