pub mod order_engine;

pub use order_engine::OrderEngine;
