mod error;
mod interface;
mod manager;
mod process;

pub use error::ToolInvokeError;
pub use interface::{ToolCatalog, ToolDescriptor, ToolOutput, ToolProvider};
pub use manager::ServerManager;
pub use process::McpProcess;
