//! Assistant orchestration for bookly.
//!
//! This crate owns the conversation with the hosted assistant API:
//! - `engine` - the [`AssistantEngine`] seam over threads, runs and messages
//! - `openai` - the HTTP implementation of that seam
//! - `runloop` - the per-turn state machine (moderation, polling, tool
//!   dispatch, final message retrieval)
//! - `session` - long-lived chat sessions, one thread per category and
//!   language pick, plus the daily instruction date refresh
//!
//! The assistant never touches spreadsheets directly. Every side effect goes
//! through the function catalog in `bookly-functions`, and every reply the
//! customer sees comes back through the run loop.

pub mod engine;
pub mod openai;
pub mod runloop;
pub mod session;

pub use engine::{AssistantEngine, EngineError, RunHandle, RunStatus, ToolCallRequest, ToolOutput};
pub use openai::OpenAiAssistantEngine;
pub use runloop::{TurnPolicy, TurnRunner, GENERIC_FAILURE_REPLY, HARMFUL_CONTENT_REPLY};
pub use session::{
    PolicyAssistant, Session, SessionError, SessionManager, Speaker, TranscriptEntry,
};
