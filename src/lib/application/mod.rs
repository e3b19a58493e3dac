//! # Application Module
//!
//! Core application logic of the agent shell.
//!
//! ## Submodules
//!
//! - [`tooling`] - MCP tool servers behind the [`ToolProvider`](tooling::ToolProvider) trait
//! - [`agent`] - Tool-calling agent runtime
//! - [`transcript`] - Normalizing, rendering and logging agent turns
//! - [`shell`] - Interactive session loop
//! - [`once`] - Single-prompt mode

pub mod agent;
pub mod once;
pub mod shell;
pub mod tooling;
pub mod transcript;
