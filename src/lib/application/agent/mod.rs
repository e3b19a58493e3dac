//! # Agent Module
//!
//! Tool-augmented agent runtime. One invocation takes the running history and
//! the tool catalog and returns the raw turns it produced.
//!
//! ## Agent Loop
//!
//! 1. Send the conversation and tool schemas to the model provider
//! 2. If the reply requests tools, execute each one and append its result
//! 3. Repeat until the reply contains no tool calls or the step limit is hit

mod errors;
mod runner;


pub use errors::AgentError;
pub use runner::{AgentOptions, AgentRuntime, ToolCallingAgent};
