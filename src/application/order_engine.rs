use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    DomainError, LineItem, NewOrder, Order, OrderDetails, OrderFilter, OrderPage, OrderStatus,
    OrderStore, OrderTx, Payment, order::generate_serial_number,
};

/// Order lifecycle engine. Keeps orders, payments, line items and product
/// stock consistent with each other; every operation is one storage
/// transaction.
#[derive(Clone)]
pub struct OrderEngine<S> {
    store: S,
}

impl<S: OrderStore> OrderEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order: one order row, its payment, one line item per unit
    /// and the matching stock decrements, all or nothing.
    pub async fn create_order(&self, input: NewOrder) -> Result<OrderDetails, DomainError> {
        if input.lines.is_empty() {
            return Err(DomainError::InvalidInput("order has no products".into()));
        }
        if let Some(line) = input.lines.iter().find(|l| l.quantity <= 0) {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be positive",
                line.product_id
            )));
        }

        let order_id = Uuid::new_v4();
        let order = Order {
            id: order_id,
            user_id: input.user_id,
            order_type: input.order_type,
            status: OrderStatus::Processing,
            pickup_date_time: input.pickup_date_time,
            created_at: Utc::now(),
        };
        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            user_id: input.user_id,
            payment_method: input.payment_method,
            address: input.address,
            amount: input.amount,
        };

        // Ordered by product id so concurrent checkouts lock rows in the same order.
        let mut per_product: BTreeMap<Uuid, i32> = BTreeMap::new();
        for line in &input.lines {
            let total = per_product.entry(line.product_id).or_default();
            *total = total.checked_add(line.quantity).ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "quantity for product {} is too large",
                    line.product_id
                ))
            })?;
        }

        let mut tx = self.store.begin().await?;

        // Stock is checked before any unit is built or written.
        for (&product_id, &quantity) in &per_product {
            let level = tx.adjust_stock(product_id, -quantity).await?;
            if level.quantity < 0 {
                tracing::warn!(
                    product_id = %product_id,
                    requested = quantity,
                    remaining = level.quantity + quantity,
                    "insufficient stock, rolling back order"
                );
                return Err(DomainError::InsufficientStock {
                    product: level.name,
                });
            }
        }

        let units: usize = per_product.values().map(|&q| q as usize).sum();
        let mut serials = HashSet::with_capacity(units);
        let mut items = Vec::with_capacity(units);
        for line in &input.lines {
            for _ in 0..line.quantity {
                let serial_no = loop {
                    let candidate = generate_serial_number();
                    if serials.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                items.push(LineItem {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    quantity: 1,
                    serial_no,
                    amount: line.base_price,
                    status: OrderStatus::Processing,
                });
            }
        }

        tx.insert_order(&order, &payment).await?;
        tx.insert_line_items(&items).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            units = items.len(),
            amount = %payment.amount,
            "order created"
        );

        Ok(OrderDetails {
            order,
            items,
            payment: Some(payment),
        })
    }

    /// Rejects the order. Returned units keep their status; every unit goes
    /// back to stock the first time the order is reversed.
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.reverse(order_id, OrderStatus::Cancelled).await
    }

    /// Marks the whole order and all of its units as returned.
    pub async fn return_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.reverse(order_id, OrderStatus::Returned).await
    }

    pub async fn approve_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.advance(order_id, OrderStatus::OrderPlaced).await
    }

    pub async fn complete_order(&self, order_id: Uuid) -> Result<Order, DomainError> {
        self.advance(order_id, OrderStatus::Delivered).await
    }

    /// Takes one unit out of an order: its amount drops to zero and the
    /// payment shrinks by the price it was sold at. Stock is left alone.
    pub async fn cancel_product(
        &self,
        serial_no: &str,
        order_id: Uuid,
    ) -> Result<Payment, DomainError> {
        let mut tx = self.store.begin().await?;
        tx.lock_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;

        let item = tx
            .line_item_by_serial(serial_no)
            .await?
            .filter(|item| item.order_id == order_id)
            .ok_or(DomainError::NotFound("Product"))?;

        if item.status.is_reversed() {
            return Err(DomainError::IllegalTransition {
                from: item.status,
                to: OrderStatus::Returned,
            });
        }

        tx.set_line_items_status(&[item.id], OrderStatus::Returned)
            .await?;
        tx.set_line_item_amount(item.id, rust_decimal::Decimal::ZERO)
            .await?;
        let payment = tx.decrement_payment(order_id, item.amount).await?;
        if payment.amount < rust_decimal::Decimal::ZERO {
            tracing::warn!(
                order_id = %order_id,
                serial_no = %serial_no,
                payment_amount = %payment.amount,
                "refund exceeds payment, rolling back"
            );
            return Err(DomainError::InvalidInput(format!(
                "refunding {} would leave the payment for order {order_id} negative",
                item.amount
            )));
        }
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            serial_no = %serial_no,
            refunded = %item.amount,
            payment_amount = %payment.amount,
            "line item cancelled"
        );
        Ok(payment)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetails, DomainError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, DomainError> {
        self.store.list_orders(filter).await
    }

    async fn advance(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, DomainError> {
        let mut tx = self.store.begin().await?;
        let mut order = tx
            .lock_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;

        if order.status == next {
            return Ok(order);
        }
        let status = order.status.transition(next)?;
        tx.set_order_status(order_id, status).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, from = %order.status, to = %status, "order status changed");
        order.status = status;
        Ok(order)
    }

    async fn reverse(&self, order_id: Uuid, next: OrderStatus) -> Result<Order, DomainError> {
        let mut tx = self.store.begin().await?;
        let mut order = tx
            .lock_order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order"))?;

        if order.status == next {
            return Ok(order);
        }
        let previous = order.status;
        let status = previous.transition(next)?;
        let items = tx.line_items(order_id).await?;

        tx.set_order_status(order_id, status).await?;
        let relabel: Vec<Uuid> = items
            .iter()
            .filter(|item| next != OrderStatus::Cancelled || item.status != OrderStatus::Returned)
            .map(|item| item.id)
            .collect();
        tx.set_line_items_status(&relabel, status).await?;

        let mut restocked = 0;
        if !previous.is_reversed() {
            let mut per_product: BTreeMap<Uuid, i32> = BTreeMap::new();
            for item in &items {
                *per_product.entry(item.product_id).or_default() += item.quantity;
            }
            for (product_id, quantity) in per_product {
                tx.adjust_stock(product_id, quantity).await?;
                restocked += quantity;
            }
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            from = %previous,
            to = %status,
            restocked,
            "order reversed"
        );
        order.status = status;
        Ok(order)
    }
}
