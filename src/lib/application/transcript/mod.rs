//! # Transcript Module
//!
//! Consumes the raw turn stream returned by one agent invocation and turns it
//! into console output, running history entries and session log records.
//!
//! - [`normalizer`] - raw JSON turns into [`Turn`](crate::domain::Turn)
//! - [`answer`] - final answer selection and `<result>` extraction
//! - [`renderer`] - console trace
//! - [`reconciler`] - history and log bookkeeping
//! - [`session_log`] - JSON transcript file

pub mod answer;
mod error;
pub mod normalizer;
pub mod reconciler;
pub mod renderer;
pub mod session_log;

pub use answer::{FinalAnswer, extract_result_span, select_final_answer};
pub use error::TranscriptError;
pub use normalizer::{TurnStream, normalize_stream, normalize_turn};
pub use reconciler::LogReconciler;
pub use renderer::ConsoleRenderer;
pub use session_log::SessionLog;
