pub mod bmi;
pub mod errors;
pub mod order;
pub mod ports;
pub mod product;

pub use errors::DomainError;
pub use order::{
    CartLine, LineItem, NewOrder, Order, OrderDetails, OrderFilter, OrderPage, OrderStatus,
    OrderType, Payment, PaymentMethod,
};
pub use ports::{OrderStore, OrderTx, StockLevel};
pub use product::{Category, Product};
