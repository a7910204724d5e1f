use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{LineItem, Order, OrderDetails, OrderFilter, OrderPage, OrderStatus, Payment};

/// Stock of one product as read back inside a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
}

/// Persistent home of orders, payments, line items and product stock.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    type Tx: OrderTx;

    async fn begin(&self) -> Result<Self::Tx, DomainError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError>;

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, DomainError>;
}

/// Unit of work over an [`OrderStore`]. Dropping it without calling
/// [`OrderTx::commit`] discards every write made through it.
#[async_trait]
pub trait OrderTx: Send {
    async fn insert_order(&mut self, order: &Order, payment: &Payment) -> Result<(), DomainError>;

    async fn insert_line_items(&mut self, items: &[LineItem]) -> Result<(), DomainError>;

    /// Adds `delta` to the product's quantity in a single read-modify-write
    /// and returns the value as it reads after the write. The row stays
    /// locked until the transaction ends.
    async fn adjust_stock(&mut self, product_id: Uuid, delta: i32)
    -> Result<StockLevel, DomainError>;

    /// Loads the order and holds it against concurrent lifecycle changes.
    async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;

    async fn line_items(&mut self, order_id: Uuid) -> Result<Vec<LineItem>, DomainError>;

    async fn line_item_by_serial(
        &mut self,
        serial_no: &str,
    ) -> Result<Option<LineItem>, DomainError>;

    async fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), DomainError>;

    async fn set_line_items_status(
        &mut self,
        ids: &[Uuid],
        status: OrderStatus,
    ) -> Result<(), DomainError>;

    async fn set_line_item_amount(&mut self, id: Uuid, amount: Decimal)
    -> Result<(), DomainError>;

    /// Subtracts `by` from the order's payment and returns the updated payment.
    async fn decrement_payment(
        &mut self,
        order_id: Uuid,
        by: Decimal,
    ) -> Result<Payment, DomainError>;

    async fn commit(self) -> Result<(), DomainError>;
}
