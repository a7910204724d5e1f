pub mod audit_logs;
pub mod orders;
pub mod payments;
pub mod product_orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use product_orders::Entity as ProductOrders;
pub use products::Entity as Products;
pub use users::Entity as Users;
