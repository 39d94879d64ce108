//! Orders and products exchanged as JSON.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A business-rule violation on a [`Product`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("product: id is required")]
    MissingId,
    #[error("product: name is required")]
    MissingName,
    #[error("product: price must be greater than zero")]
    NonPositivePrice,
    #[error("product: stock cannot be negative")]
    NegativeStock,
}

/// A business-rule violation on an [`Order`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order: id is required")]
    MissingId,
    #[error("order: customer_id is required")]
    MissingCustomerId,
    #[error("order: must contain at least one product")]
    NoProducts,
    #[error("order: status is required")]
    MissingStatus,
    #[error("order: product at index {index} is invalid")]
    InvalidProduct {
        index: usize,
        #[source]
        source: ProductError,
    },
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// A product that can be ordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Units in stock. Omitted from JSON when zero.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub stock: i64,
    /// Keeps the offset it was written with.
    pub created_at: DateTime<FixedOffset>,
}

impl Product {
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.id.is_empty() {
            return Err(ProductError::MissingId);
        }
        if self.name.is_empty() {
            return Err(ProductError::MissingName);
        }
        if self.price.is_nan() || self.price <= 0.0 {
            return Err(ProductError::NonPositivePrice);
        }
        if self.stock < 0 {
            return Err(ProductError::NegativeStock);
        }
        Ok(())
    }
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    /// Omitted from JSON when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<FixedOffset>,
}

impl Order {
    /// Sets `total_amount` to the sum of the product prices.
    pub fn calculate_total(&mut self) {
        self.total_amount = self.products.iter().map(|p| p.price).sum();
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if self.id.is_empty() {
            return Err(OrderError::MissingId);
        }
        if self.customer_id.is_empty() {
            return Err(OrderError::MissingCustomerId);
        }
        if self.products.is_empty() {
            return Err(OrderError::NoProducts);
        }
        if self.status.is_empty() {
            return Err(OrderError::MissingStatus);
        }
        for (index, product) in self.products.iter().enumerate() {
            product
                .validate()
                .map_err(|source| OrderError::InvalidProduct { index, source })?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn created_at() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 7, 5, 10, 30, 0)
            .unwrap()
    }

    fn notebook() -> Product {
        Product {
            id: "p1".to_string(),
            name: "Notebook".to_string(),
            price: 3500.0,
            stock: 10,
            created_at: created_at(),
        }
    }

    fn order_with(products: Vec<Product>) -> Order {
        Order {
            id: "o1".to_string(),
            customer_id: "c123".to_string(),
            products,
            total_amount: 0.0,
            status: "created".to_string(),
            created_at: created_at(),
        }
    }

    #[test]
    fn test_product_validation() {
        assert_eq!(notebook().validate(), Ok(()));

        let mut product = notebook();
        product.id.clear();
        assert_eq!(product.validate(), Err(ProductError::MissingId));

        let mut product = notebook();
        product.name.clear();
        assert_eq!(product.validate(), Err(ProductError::MissingName));

        let mut product = notebook();
        product.price = 0.0;
        assert_eq!(product.validate(), Err(ProductError::NonPositivePrice));
        product.price = f64::NAN;
        assert_eq!(product.validate(), Err(ProductError::NonPositivePrice));

        let mut product = notebook();
        product.stock = -1;
        assert_eq!(product.validate(), Err(ProductError::NegativeStock));
    }

    #[test]
    fn test_order_validation() {
        assert_eq!(order_with(vec![notebook()]).validate(), Ok(()));
        assert_eq!(order_with(vec![]).validate(), Err(OrderError::NoProducts));

        let mut order = order_with(vec![notebook()]);
        order.customer_id.clear();
        assert_eq!(order.validate(), Err(OrderError::MissingCustomerId));

        let mut order = order_with(vec![notebook()]);
        order.status.clear();
        assert_eq!(order.validate(), Err(OrderError::MissingStatus));

        let mut broken = notebook();
        broken.price = -5.0;
        assert_eq!(
            order_with(vec![notebook(), broken]).validate(),
            Err(OrderError::InvalidProduct {
                index: 1,
                source: ProductError::NonPositivePrice
            })
        );
    }

    #[test]
    fn test_calculate_total_sums_prices() {
        let mut mouse = notebook();
        mouse.id = "p2".to_string();
        mouse.price = 150.5;
        let mut order = order_with(vec![notebook(), mouse]);

        order.calculate_total();

        assert_eq!(order.total_amount, 3650.5);
    }

    #[test]
    fn test_json_omits_zero_stock_and_empty_products() {
        let mut product = notebook();
        product.stock = 0;
        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("stock").is_none());
        assert_eq!(value["created_at"], "2025-07-05T10:30:00-03:00");

        let value: Value = serde_json::from_str(&order_with(vec![]).to_json_pretty().unwrap()).unwrap();
        assert!(value.get("products").is_none());
        assert_eq!(value["customer_id"], "c123");
    }

    #[test]
    fn test_json_round_trip() {
        let mut order = order_with(vec![notebook()]);
        order.calculate_total();

        let decoded = Order::from_json(&order.to_json_pretty().unwrap()).unwrap();

        assert_eq!(decoded, order);
    }

    #[test]
    fn test_json_round_trip_keeps_every_price_bit() {
        let prices = [
            909623.5210000001,
            963972.7500000001,
            125064.86700000003,
            0.1 + 0.2,
            1.0715660391465826e-75,
            -1.603964615428183e143,
        ];
        let products = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| Product {
                id: format!("p{}", i),
                price,
                ..notebook()
            })
            .collect();
        let mut order = order_with(products);
        order.calculate_total();

        let decoded = Order::from_json(&order.to_json_pretty().unwrap()).unwrap();

        for (got, want) in decoded.products.iter().zip(&order.products) {
            assert_eq!(got.price.to_bits(), want.price.to_bits(), "price {}", want.price);
        }
        assert_eq!(decoded.total_amount.to_bits(), order.total_amount.to_bits());
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_json_round_trip_keeps_timestamp_offset() {
        let json = r#"{
            "id": "o1",
            "customer_id": "c123",
            "total_amount": 0.0,
            "status": "created",
            "created_at": "2025-07-05T10:30:00-03:00"
        }"#;

        let order = Order::from_json(json).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["created_at"], "2025-07-05T10:30:00-03:00");
        assert_eq!(order.created_at, created_at());
    }
}
