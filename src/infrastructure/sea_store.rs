use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    domain::{
        DomainError, LineItem, Order, OrderDetails, OrderFilter, OrderPage, OrderStatus,
        OrderStore, OrderTx, Payment, StockLevel,
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments},
        product_orders::{
            ActiveModel as LineItemActive, Column as LineItemCol, Entity as ProductOrders,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    models::{line_item_from_entity, order_from_entity, payment_from_entity},
};

impl From<DbErr> for DomainError {
    fn from(err: DbErr) -> Self {
        DomainError::Storage(err.to_string())
    }
}

/// Rows per line item INSERT. Each row binds 7 parameters and Postgres
/// accepts at most 65535 per statement.
const LINE_ITEM_BATCH: usize = 5000;

/// PostgreSQL-backed [`OrderStore`].
#[derive(Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

pub struct SeaOrmTx {
    txn: DatabaseTransaction,
}

#[async_trait]
impl OrderStore for SeaOrmStore {
    type Tx = SeaOrmTx;

    async fn begin(&self) -> Result<SeaOrmTx, DomainError> {
        let txn = self.conn.begin().await?;
        Ok(SeaOrmTx { txn })
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<OrderDetails>, DomainError> {
        let Some(order) = Orders::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        let order = order_from_entity(order)?;

        let items = ProductOrders::find()
            .filter(LineItemCol::OrderId.eq(id))
            .order_by_asc(LineItemCol::CreatedAt)
            .order_by_asc(LineItemCol::SerialNo)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(line_item_from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        let payment = Payments::find()
            .filter(PaymentCol::OrderId.eq(id))
            .one(&self.conn)
            .await?
            .map(payment_from_entity)
            .transpose()?;

        Ok(Some(OrderDetails {
            order,
            items,
            payment,
        }))
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<OrderPage, DomainError> {
        let mut condition = Condition::all();
        if let Some(user_id) = filter.user_id {
            condition = condition.add(OrderCol::UserId.eq(user_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }

        let mut finder = Orders::find().filter(condition);
        finder = if filter.newest_first {
            finder.order_by_desc(OrderCol::CreatedAt)
        } else {
            finder.order_by_asc(OrderCol::CreatedAt)
        };

        let total = finder.clone().count(&self.conn).await? as i64;

        let orders = finder
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

        let mut items_by_order: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        let mut payments_by_order: HashMap<Uuid, Payment> = HashMap::new();
        if !ids.is_empty() {
            let items = ProductOrders::find()
                .filter(LineItemCol::OrderId.is_in(ids.clone()))
                .order_by_asc(LineItemCol::CreatedAt)
                .order_by_asc(LineItemCol::SerialNo)
                .all(&self.conn)
                .await?;
            for item in items {
                let item = line_item_from_entity(item)?;
                items_by_order.entry(item.order_id).or_default().push(item);
            }

            let payments = Payments::find()
                .filter(PaymentCol::OrderId.is_in(ids))
                .all(&self.conn)
                .await?;
            for payment in payments {
                let payment = payment_from_entity(payment)?;
                payments_by_order.insert(payment.order_id, payment);
            }
        }

        let items = orders
            .into_iter()
            .map(|order| OrderDetails {
                items: items_by_order.remove(&order.id).unwrap_or_default(),
                payment: payments_by_order.remove(&order.id),
                order,
            })
            .collect();

        Ok(OrderPage { items, total })
    }
}

#[async_trait]
impl OrderTx for SeaOrmTx {
    async fn insert_order(&mut self, order: &Order, payment: &Payment) -> Result<(), DomainError> {
        OrderActive {
            id: Set(order.id),
            user_id: Set(order.user_id),
            order_type: Set(order.order_type.as_str().into()),
            status: Set(order.status.as_str().into()),
            pickup_date_time: Set(order.pickup_date_time.map(Into::into)),
            created_at: Set(order.created_at.into()),
            updated_at: Set(order.created_at.into()),
        }
        .insert(&self.txn)
        .await?;

        PaymentActive {
            id: Set(payment.id),
            order_id: Set(payment.order_id),
            user_id: Set(payment.user_id),
            payment_method: Set(payment.payment_method.as_str().into()),
            address: Set(payment.address.clone()),
            amount: Set(payment.amount),
            created_at: NotSet,
        }
        .insert(&self.txn)
        .await?;

        Ok(())
    }

    async fn insert_line_items(&mut self, items: &[LineItem]) -> Result<(), DomainError> {
        for batch in items.chunks(LINE_ITEM_BATCH) {
            let rows = batch.iter().map(|item| LineItemActive {
                id: Set(item.id),
                order_id: Set(item.order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                serial_no: Set(item.serial_no.clone()),
                amount: Set(item.amount),
                status: Set(item.status.as_str().into()),
                created_at: NotSet,
            });
            ProductOrders::insert_many(rows).exec(&self.txn).await?;
        }
        Ok(())
    }

    async fn adjust_stock(
        &mut self,
        product_id: Uuid,
        delta: i32,
    ) -> Result<StockLevel, DomainError> {
        // Relative update: the row lock taken here is held until commit, so
        // concurrent checkouts of the same product queue behind each other.
        let result = Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).add(delta))
            .col_expr(ProdCol::UpdatedAt, Expr::current_timestamp().into())
            .filter(ProdCol::Id.eq(product_id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Product"));
        }

        let product = Products::find_by_id(product_id)
            .one(&self.txn)
            .await?
            .ok_or(DomainError::NotFound("Product"))?;

        Ok(StockLevel {
            product_id,
            name: product.name,
            quantity: product.quantity,
        })
    }

    async fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Orders::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?
            .map(order_from_entity)
            .transpose()
    }

    async fn line_items(&mut self, order_id: Uuid) -> Result<Vec<LineItem>, DomainError> {
        ProductOrders::find()
            .filter(LineItemCol::OrderId.eq(order_id))
            .order_by_asc(LineItemCol::CreatedAt)
            .order_by_asc(LineItemCol::SerialNo)
            .all(&self.txn)
            .await?
            .into_iter()
            .map(line_item_from_entity)
            .collect()
    }

    async fn line_item_by_serial(
        &mut self,
        serial_no: &str,
    ) -> Result<Option<LineItem>, DomainError> {
        ProductOrders::find()
            .filter(LineItemCol::SerialNo.eq(serial_no))
            .one(&self.txn)
            .await?
            .map(line_item_from_entity)
            .transpose()
    }

    async fn set_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), DomainError> {
        let result = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(status.as_str()))
            .col_expr(OrderCol::UpdatedAt, Expr::current_timestamp().into())
            .filter(OrderCol::Id.eq(order_id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    async fn set_line_items_status(
        &mut self,
        ids: &[Uuid],
        status: OrderStatus,
    ) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        ProductOrders::update_many()
            .col_expr(LineItemCol::Status, Expr::value(status.as_str()))
            .filter(LineItemCol::Id.is_in(ids.to_vec()))
            .exec(&self.txn)
            .await?;
        Ok(())
    }

    async fn set_line_item_amount(&mut self, id: Uuid, amount: Decimal) -> Result<(), DomainError> {
        let result = ProductOrders::update_many()
            .col_expr(LineItemCol::Amount, Expr::value(amount))
            .filter(LineItemCol::Id.eq(id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }

    async fn decrement_payment(
        &mut self,
        order_id: Uuid,
        by: Decimal,
    ) -> Result<Payment, DomainError> {
        Payments::update_many()
            .col_expr(PaymentCol::Amount, Expr::col(PaymentCol::Amount).sub(by))
            .filter(PaymentCol::OrderId.eq(order_id))
            .exec(&self.txn)
            .await?;

        let payment = Payments::find()
            .filter(PaymentCol::OrderId.eq(order_id))
            .one(&self.txn)
            .await?
            .ok_or(DomainError::NotFound("Payment"))?;
        payment_from_entity(payment)
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.txn.commit().await?;
        Ok(())
    }
}
