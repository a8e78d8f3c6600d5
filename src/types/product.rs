use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use super::validation::{ValidationErrors, check_max_len, check_required_text};

pub const MAX_PRODUCT_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 255;
/// Prices are stored with two fractional digits.
pub const PRICE_SCALE: u32 = 2;

/// Largest price representable as `numeric(10,2)`: 99,999,999.99.
pub fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, PRICE_SCALE)
}

/// Body of `POST /products/` and `PUT /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category_id: i64,
}

/// Product fields that passed validation; used for both insert and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i64,
}

impl ProductPayload {
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required_text(&mut errors, "name", &self.name, MAX_PRODUCT_NAME_LEN);
        if let Some(description) = self.description.as_deref() {
            check_max_len(&mut errors, "description", description, MAX_DESCRIPTION_LEN);
        }

        let price = round_price(self.price);
        if price <= Decimal::ZERO {
            errors.push("price", "must be greater than 0");
        } else if price > max_price() {
            errors.push("price", format!("must be at most {}", max_price()));
        }

        errors.into_result(NewProduct {
            name: self.name,
            description: self.description,
            price,
            category_id: self.category_id,
        })
    }
}

/// Rounds half away from zero to the stored scale, the way `numeric(10,2)` does.
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
