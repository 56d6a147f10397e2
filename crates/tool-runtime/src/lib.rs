pub mod catalog;
pub mod dispatch;
pub mod registry;
pub mod retry;
pub mod tool;
pub mod tools;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use catalog::ToolKind;
pub use dispatch::{Dispatcher, Invocation};
pub use registry::ToolRegistry;
pub use retry::{NotFoundClassifier, NotFoundMatcher, RetryPolicy};
pub use tool::{Tool, ToolDefinition, ToolError, ToolResult};
pub use tools::{warehouse_registry, WarehouseTool};
