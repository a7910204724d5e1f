//! In-process [`OrderStore`] used by tests and local experiments.
//!
//! A transaction holds the store lock from `begin` until it is committed or
//! dropped, so transactions run one at a time and every check made inside one
//! is authoritative. Writes go to a private copy that replaces the shared
//! state on commit.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{
    DomainError, LineItem, Order, OrderDetails, OrderFilter, OrderPage, OrderStatus, OrderStore,
    OrderTx, Payment, Product, StockLevel,
};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
    payments: HashMap<Uuid, Payment>,
    items: Vec<LineItem>,
    serials: HashSet<String>,
}

impl State {
    fn details(&self, order: &Order) -> OrderDetails {
        OrderDetails {
            order: order.clone(),
            items: self
                .items
                .iter()
                .filter(|item| item.order_id == order.id)
                .cloned()
                .collect(),
            payment: self.payments.get(&order.id).cloned(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product);
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.state.lock().await.products.get(&id).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn line_item_count(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn payment_count(&self) -> usize {
        self.state.lock().await.payments.len()
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    work: State,
}

#[async_trait]
impl OrderStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| state.details(o)))
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, DomainError> {
        let state = self.state.lock().await;
        let mut matching: Vec<&Order> = state
            .orders
            .iter()
            .filter(|o| filter.user_id.is_none_or(|user_id| o.user_id == user_id))
            .filter(|o| filter.status.is_none_or(|status| o.status == status))
            .collect();
        matching.sort_by_key(|o| o.created_at);
        if filter.newest_first {
            matching.reverse();
        }

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .map(|o| state.details(o))
            .collect();
        Ok(OrderPage { items, total })
    }
}

#[async_trait]
impl OrderTx for MemoryTx {
    async fn insert_order(&mut self, order: &Order, payment: &Payment) -> Result<(), DomainError> {
        if self.work.orders.iter().any(|o| o.id == order.id) {
            return Err(DomainError::Storage(format!("duplicate order {}", order.id)));
        }
        self.work.orders.push(order.clone());
        self.work.payments.insert(order.id, payment.clone());
        Ok(())
    }

    async fn insert_line_items(&mut self, items: &[LineItem]) -> Result<(), DomainError> {
        for item in items {
            if !self.work.serials.insert(item.serial_no.clone()) {
                return Err(DomainError::Storage(format!(
                    "duplicate serial number {}",
                    item.serial_no
                )));
            }
            self.work.items.push(item.clone());
        }
        Ok(())
    }

    async fn adjust_stock(
        &mut self,
        product_id: Uuid,
        delta: i32,
    ) -> Result<StockLevel, DomainError> {
        let product = self
            .work
            .products
            .get_mut(&product_id)
            .ok_or(DomainError::NotFound("Product"))?;
        product.quantity += delta;
        Ok(StockLevel {
            product_id,
            name: product.name.clone(),
            quantity: product.quantity,
        })
    }

    async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.work.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn line_items(&mut self, order_id: Uuid) -> Result<Vec<LineItem>, DomainError> {
        Ok(self
            .work
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn line_item_by_serial(
        &mut self,
        serial_no: &str,
    ) -> Result<Option<LineItem>, DomainError> {
        Ok(self
            .work
            .items
            .iter()
            .find(|i| i.serial_no == serial_no)
            .cloned())
    }

    async fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), DomainError> {
        let order = self
            .work
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(DomainError::NotFound("Order"))?;
        order.status = status;
        Ok(())
    }

    async fn set_line_items_status(
        &mut self,
        ids: &[Uuid],
        status: OrderStatus,
    ) -> Result<(), DomainError> {
        for item in self.work.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            item.status = status;
        }
        Ok(())
    }

    async fn set_line_item_amount(&mut self, id: Uuid, amount: Decimal) -> Result<(), DomainError> {
        let item = self
            .work
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        item.amount = amount;
        Ok(())
    }

    async fn decrement_payment(
        &mut self,
        order_id: Uuid,
        by: Decimal,
    ) -> Result<Payment, DomainError> {
        let payment = self
            .work
            .payments
            .get_mut(&order_id)
            .ok_or(DomainError::NotFound("Payment"))?;
        payment.amount -= by;
        Ok(payment.clone())
    }

    async fn commit(mut self) -> Result<(), DomainError> {
        *self.guard = self.work;
        Ok(())
    }
}
