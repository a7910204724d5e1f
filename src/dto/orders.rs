use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{CartLine, NewOrder, OrderDetails, OrderType, PaymentMethod},
    error::AppError,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLineRequest {
    /// Product id.
    pub id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub base_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub products: Vec<CartLineRequest>,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub address: String,
    pub pickup_date_time: Option<DateTime<Utc>>,
}

impl CreateOrderRequest {
    /// Checks the checkout form and turns it into engine input for `user_id`.
    pub fn validate(self, user_id: Uuid) -> Result<NewOrder, AppError> {
        if self.products.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }

        let mut seen = HashSet::new();
        for line in &self.products {
            if line.quantity < 1 {
                return Err(AppError::BadRequest("Cart has invalid quantity".into()));
            }
            if line.base_price.is_sign_negative() {
                return Err(AppError::BadRequest("Cart has invalid price".into()));
            }
            if !seen.insert(line.id) {
                return Err(AppError::BadRequest(format!(
                    "Product {} appears more than once",
                    line.id
                )));
            }
        }

        if self.amount.is_sign_negative() {
            return Err(AppError::BadRequest("Amount must not be negative".into()));
        }
        let address = self.address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("Address is required".into()));
        }
        if self.order_type == OrderType::Pickup && self.pickup_date_time.is_none() {
            return Err(AppError::BadRequest(
                "Pickup date and time is required for pickup orders".into(),
            ));
        }

        Ok(NewOrder {
            user_id,
            lines: self
                .products
                .into_iter()
                .map(|line| CartLine {
                    product_id: line.id,
                    quantity: line.quantity,
                    base_price: line.base_price,
                })
                .collect(),
            amount: self.amount,
            order_type: self.order_type,
            payment_method: self.payment_method,
            address: address.to_string(),
            pickup_date_time: self.pickup_date_time,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderDetails>,
}
