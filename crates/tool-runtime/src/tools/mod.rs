pub mod warehouse;

pub use warehouse::{warehouse_registry, WarehouseTool};
