use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Product {product} has insufficient quantity")]
    InsufficientStock { product: String },

    #[error("Cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_the_product() {
        let err = DomainError::InsufficientStock {
            product: "Creatine Monohydrate".into(),
        };
        assert_eq!(
            err.to_string(),
            "Product Creatine Monohydrate has insufficient quantity"
        );
    }

    #[test]
    fn illegal_transition_display() {
        let err = DomainError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Cannot move from DELIVERED to CANCELLED");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(DomainError::NotFound("Order").to_string(), "Order not found");
    }
}
