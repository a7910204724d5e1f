//! Mapping from SeaORM rows to domain records. Enumerations are stored as
//! text, so a row the domain cannot read is reported as a storage error.

use std::str::FromStr;

use chrono::Utc;

use crate::{
    domain::{DomainError, LineItem, Order, Payment, Product},
    entity::{orders, payments, product_orders, products},
};

fn parse_column<T>(value: &str, column: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|_| DomainError::Storage(format!("unreadable {column} value {value:?}")))
}

pub fn order_from_entity(model: orders::Model) -> Result<Order, DomainError> {
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        order_type: parse_column(&model.order_type, "orders.order_type")?,
        status: parse_column(&model.status, "orders.status")?,
        pickup_date_time: model.pickup_date_time.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub fn line_item_from_entity(model: product_orders::Model) -> Result<LineItem, DomainError> {
    Ok(LineItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        serial_no: model.serial_no,
        amount: model.amount,
        status: parse_column(&model.status, "product_orders.status")?,
    })
}

pub fn payment_from_entity(model: payments::Model) -> Result<Payment, DomainError> {
    Ok(Payment {
        id: model.id,
        order_id: model.order_id,
        user_id: model.user_id,
        payment_method: parse_column(&model.payment_method, "payments.payment_method")?,
        address: model.address,
        amount: model.amount,
    })
}

pub fn product_from_entity(model: products::Model) -> Result<Product, DomainError> {
    Ok(Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        quantity: model.quantity,
        category: parse_column(&model.category, "products.category")?,
        vendor: model.vendor,
        image: model.image,
    })
}
