use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("assistant API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not decode assistant API response: {0}")]
    Decode(String),
    #[error("run finished without an assistant message")]
    EmptyResponse,
}

/// A pending tool call surfaced by a `requires_action` run. `arguments` is
/// the raw JSON string exactly as the assistant produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction(Vec<ToolCallRequest>),
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled | Self::Expired)
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction(_) => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunHandle {
    pub run_id: String,
    pub status: RunStatus,
}

/// Seam over the hosted assistant API. The run loop and session manager only
/// speak this trait; tests script it, production uses
/// [`crate::OpenAiAssistantEngine`].
#[async_trait]
pub trait AssistantEngine: Send + Sync {
    /// Returns `true` when the input is flagged by content moderation.
    async fn moderate(&self, input: &str) -> Result<bool, EngineError>;

    async fn create_thread(&self) -> Result<String, EngineError>;

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), EngineError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str)
        -> Result<RunHandle, EngineError>;

    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<RunHandle, EngineError>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunHandle, EngineError>;

    /// The newest assistant message produced by the given run, if any.
    async fn latest_assistant_message(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Option<String>, EngineError>;

    async fn assistant_instructions(&self, assistant_id: &str) -> Result<String, EngineError>;

    async fn update_assistant_instructions(
        &self,
        assistant_id: &str,
        instructions: &str,
    ) -> Result<(), EngineError>;
}
