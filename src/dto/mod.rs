pub mod bmi;
pub mod orders;
pub mod products;
