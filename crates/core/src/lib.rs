pub mod config;
pub mod error;
pub mod http;
pub mod warehouse;

pub use config::{RetryConfig, WarehouseConfig};
pub use error::*;
pub use http::HttpWarehouseClient;
pub use warehouse::{EnvApi, ObjectApi, UpstreamParams, WarehouseBindings};
