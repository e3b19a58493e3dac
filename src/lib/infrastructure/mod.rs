//! Adapters to systems outside the process: model provider HTTP APIs.

pub mod model;
