pub mod app;
pub mod error;
pub mod loader;
pub mod provider;
pub mod server;

pub use app::{AppConfig, SessionSettings};
pub use error::ConfigError;
pub use provider::{ModelInfo, ModelProviderConfig};
pub use server::ServerConfig;
