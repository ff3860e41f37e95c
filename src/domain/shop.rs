// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::domain::constants::BIT_DECIMALS;
use crate::domain::error::AppError;
use crate::domain::units::format_token;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Exchange Shop listing as stored by the shop contract. Price is in BIT units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: U256,
    pub merchant: Address,
    pub stock: u64,
    pub active: bool,
    pub category: String,
    pub image_url: String,
    pub merchant_whatsapp: String,
}

impl Item {
    pub fn is_available(&self) -> bool {
        self.active && self.stock > 0
    }

    pub fn display_price(&self) -> String {
        format!("{} BIT", format_token(self.price, BIT_DECIMALS))
    }
}

/// Immutable snapshot of the shop contents, replaced wholesale on refetch.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn available(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| i.is_available())
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Item> {
        self.items
            .iter()
            .filter(move |i| i.category.eq_ignore_ascii_case(category))
    }

    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = self.items.iter().map(|i| i.category.clone()).collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Delivery details collected during an exchange. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
}

impl ShippingInfo {
    /// Required-field check; reports the first missing field.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("phoneNumber", &self.phone_number),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("zipCode", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(field, "is required"));
            }
        }

        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .map(|(user, domain)| {
                !user.is_empty()
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            })
            .unwrap_or(false);
        if !valid_email {
            return Err(AppError::validation("email", "is not a valid address"));
        }
        Ok(())
    }

    pub fn landmark(&self) -> Option<&str> {
        self.landmark
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::whole_tokens;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Ada Obi".into(),
            email: "ada@example.com".into(),
            phone_number: "+234 800 000 0000".into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            country: "Nigeria".into(),
            zip_code: "100001".into(),
            landmark: None,
        }
    }

    fn item(id: u64, category: &str, stock: u64, active: bool) -> Item {
        Item {
            id,
            name: format!("item-{id}"),
            description: String::new(),
            price: whole_tokens(250, BIT_DECIMALS),
            merchant: Address::ZERO,
            stock,
            active,
            category: category.into(),
            image_url: String::new(),
            merchant_whatsapp: "2348000000000".into(),
        }
    }

    #[test]
    fn shipping_requires_every_field_but_landmark() {
        assert!(shipping().validate().is_ok());

        let mut missing_zip = shipping();
        missing_zip.zip_code = "  ".into();
        match missing_zip.validate() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "zipCode"),
            other => panic!("unexpected {other:?}"),
        }

        let mut bad_email = shipping();
        bad_email.email = "ada@example".into();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn catalog_filters_available_and_categories() {
        let catalog = Catalog::new(vec![
            item(1, "Gadgets", 3, true),
            item(2, "Food", 0, true),
            item(3, "gadgets", 5, false),
        ]);
        assert_eq!(catalog.available().count(), 1);
        assert_eq!(catalog.by_category("GADGETS").count(), 2);
        assert_eq!(catalog.categories(), vec!["Food", "Gadgets", "gadgets"]);
        assert_eq!(catalog.find(1).unwrap().display_price(), "250 BIT");
    }
}
