//! MCP stdio servers used as the agent shell's tool providers.
//!
//! - [`protocol`] - JSON-RPC 2.0 message types
//! - [`server`] - line-delimited stdio server driving a [`ToolSet`]
//! - [`files`] - workspace-confined text file tools
//! - [`math`] - arithmetic tools

mod error;
pub mod files;
pub mod math;
pub mod protocol;
pub mod server;

pub use error::ToolError;
pub use files::FileTools;
pub use math::MathTools;
pub use server::{McpServer, ToolSet, ToolSpec};

use tracing_subscriber::{EnvFilter, fmt};

/// Stdout carries the protocol, so logs always go to stderr.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(false)
            .init();
    });
}
