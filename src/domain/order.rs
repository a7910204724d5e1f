use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

/// Lifecycle of an order. Line items reuse the same values so that a single
/// unit can be reversed while its order is still live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    OrderPlaced,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::OrderPlaced => "ORDER_PLACED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        }
    }

    /// Cancelled and returned orders have already given their stock back.
    pub fn is_reversed(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Processing, OrderPlaced)
                | (Processing, Cancelled)
                | (Processing, Returned)
                | (OrderPlaced, Delivered)
                | (OrderPlaced, Cancelled)
                | (OrderPlaced, Returned)
                | (Delivered, Returned)
                | (Cancelled, Returned)
        )
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(OrderStatus::Processing),
            "ORDER_PLACED" => Ok(OrderStatus::OrderPlaced),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "RETURNED" => Ok(OrderStatus::Returned),
            other => Err(DomainError::InvalidInput(format!("unknown order status {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Pickup,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Pickup => "PICKUP",
            OrderType::Delivery => "DELIVERY",
        }
    }
}

impl FromStr for OrderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PICKUP" => Ok(OrderType::Pickup),
            "DELIVERY" => Ok(OrderType::Delivery),
            other => Err(DomainError::InvalidInput(format!("unknown order type {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "DEBIT_CARD" => Ok(PaymentMethod::DebitCard),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(DomainError::InvalidInput(format!(
                "unknown payment method {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub pickup_date_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One physical unit of a purchased product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub serial_no: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub payment_method: PaymentMethod,
    pub address: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<LineItem>,
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub base_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub amount: Decimal,
    pub order_type: OrderType,
    pub payment_method: PaymentMethod,
    pub address: String,
    pub pickup_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub limit: u64,
    pub offset: u64,
    pub newest_first: bool,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            status: None,
            limit: 20,
            offset: 0,
            newest_first: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<OrderDetails>,
    pub total: i64,
}

const SERIAL_FLOOR: u128 = 1_000_000_000_000_000;
const SERIAL_SPAN: u128 = 9_000_000_000_000_000;

/// 16 decimal digits, never starting with zero.
pub fn generate_serial_number() -> String {
    let n = SERIAL_FLOOR + Uuid::new_v4().as_u128() % SERIAL_SPAN;
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn serial_numbers_are_sixteen_digits() {
        for _ in 0..1_000 {
            let serial = generate_serial_number();
            assert_eq!(serial.len(), 16, "{serial}");
            assert!(serial.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(serial.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn serial_numbers_do_not_repeat() {
        let serials: HashSet<String> = (0..10_000).map(|_| generate_serial_number()).collect();
        assert_eq!(serials.len(), 10_000);
    }

    #[test]
    fn happy_path_transitions() {
        assert_eq!(
            OrderStatus::Processing.transition(OrderStatus::OrderPlaced).unwrap(),
            OrderStatus::OrderPlaced
        );
        assert_eq!(
            OrderStatus::OrderPlaced.transition(OrderStatus::Delivered).unwrap(),
            OrderStatus::Delivered
        );
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Returned));
        assert!(OrderStatus::Cancelled.can_transition_to(OrderStatus::Returned));
    }

    #[test]
    fn rejected_transitions() {
        let illegal = [
            (OrderStatus::Processing, OrderStatus::Delivered),
            (OrderStatus::Delivered, OrderStatus::Cancelled),
            (OrderStatus::Delivered, OrderStatus::OrderPlaced),
            (OrderStatus::Cancelled, OrderStatus::OrderPlaced),
            (OrderStatus::Cancelled, OrderStatus::Delivered),
            (OrderStatus::Returned, OrderStatus::Cancelled),
            (OrderStatus::Returned, OrderStatus::Delivered),
        ];
        for (from, to) in illegal {
            let err = from.transition(to).unwrap_err();
            assert!(
                matches!(err, DomainError::IllegalTransition { .. }),
                "{from} -> {to}"
            );
        }
    }

    #[test]
    fn nothing_leaves_returned() {
        use OrderStatus::*;
        for next in [Processing, OrderPlaced, Delivered, Cancelled, Returned] {
            assert!(!Returned.can_transition_to(next));
        }
    }

    #[test]
    fn status_text_round_trips_through_storage_form() {
        use OrderStatus::*;
        for status in [Processing, OrderPlaced, Delivered, Cancelled, Returned] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_like_storage_form() {
        let json = serde_json::to_string(&OrderStatus::OrderPlaced).unwrap();
        assert_eq!(json, "\"ORDER_PLACED\"");
    }
}
