pub mod memory;
pub mod sea_store;

pub use memory::MemoryStore;
pub use sea_store::SeaOrmStore;
