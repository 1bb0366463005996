use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use bookly_functions::FunctionCatalog;

use crate::engine::{AssistantEngine, EngineError, RunHandle, RunStatus, ToolOutput};

/// Reply for prompts flagged by moderation.
pub const HARMFUL_CONTENT_REPLY: &str = "Harmful content.";

/// Reply for any turn that fails before a final message is available.
pub const GENERIC_FAILURE_REPLY: &str = "Error getting response.";

/// Tunables for a single turn. Production values come from the engine
/// config; tests drop the poll interval to zero.
#[derive(Clone, Copy, Debug)]
pub struct TurnPolicy {
    pub max_iterations: u32,
    pub poll_interval: Duration,
    /// Customer-facing turns are moderated; internal prompts (the policy
    /// assistant lookup) are not.
    pub moderate_input: bool,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self { max_iterations: 10, poll_interval: Duration::from_secs(3), moderate_input: true }
    }
}

/// Drives one user prompt to a final assistant reply.
///
/// The loop runs at most `max_iterations` steps. Each step either resolves a
/// `requires_action` batch and submits the outputs, or sleeps and re-polls.
/// Whatever state the run ends in, the customer gets a string back; engine
/// failures collapse to [`GENERIC_FAILURE_REPLY`].
pub struct TurnRunner {
    engine: Arc<dyn AssistantEngine>,
    catalog: FunctionCatalog,
    policy: TurnPolicy,
}

impl TurnRunner {
    pub fn new(engine: Arc<dyn AssistantEngine>, catalog: FunctionCatalog, policy: TurnPolicy) -> Self {
        Self { engine, catalog, policy }
    }

    pub async fn run_turn(&self, thread_id: &str, assistant_id: &str, prompt: &str) -> String {
        match self.try_run_turn(thread_id, assistant_id, prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(event_name = "turn.failed", error = %err, "turn aborted");
                GENERIC_FAILURE_REPLY.to_string()
            }
        }
    }

    /// Like [`run_turn`](Self::run_turn) but surfaces the error, for callers
    /// that need to distinguish failure from a literal reply.
    pub async fn try_run_turn(
        &self,
        thread_id: &str,
        assistant_id: &str,
        prompt: &str,
    ) -> Result<String, EngineError> {
        if self.policy.moderate_input && self.engine.moderate(prompt).await? {
            warn!(event_name = "turn.flagged", "prompt flagged as harmful content");
            return Ok(HARMFUL_CONTENT_REPLY.to_string());
        }

        self.engine.add_user_message(thread_id, prompt).await?;
        let mut run = self.engine.create_run(thread_id, assistant_id).await?;

        let mut iteration = 0;
        while run.status != RunStatus::Completed && iteration < self.policy.max_iterations {
            info!(
                event_name = "turn.poll",
                iteration,
                status = run.status.label(),
                run_id = %run.run_id,
            );
            run = self.step(thread_id, run).await?;
            iteration += 1;
        }

        self.engine
            .latest_assistant_message(thread_id, &run.run_id)
            .await?
            .ok_or(EngineError::EmptyResponse)
    }

    async fn step(&self, thread_id: &str, run: RunHandle) -> Result<RunHandle, EngineError> {
        match run.status {
            RunStatus::RequiresAction(ref calls) => {
                let outputs = self.execute_tool_calls(calls).await;
                if outputs.is_empty() {
                    // Nothing runnable in the batch. Re-poll instead of
                    // resubmitting so the iteration guard still bounds the
                    // turn.
                    tokio::time::sleep(self.policy.poll_interval).await;
                    self.engine.poll_run(thread_id, &run.run_id).await
                } else {
                    let run =
                        self.engine.submit_tool_outputs(thread_id, &run.run_id, outputs).await?;
                    info!(event_name = "turn.tool_outputs_submitted", run_id = %run.run_id);
                    Ok(run)
                }
            }
            _ => {
                tokio::time::sleep(self.policy.poll_interval).await;
                self.engine.poll_run(thread_id, &run.run_id).await
            }
        }
    }

    /// Resolves a `requires_action` batch. Unknown names and failed handlers
    /// are skipped with a log line; the rest of the batch still runs.
    async fn execute_tool_calls(
        &self,
        calls: &[crate::engine::ToolCallRequest],
    ) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());

        for call in calls {
            match self.catalog.invoke(&call.name, &call.arguments).await {
                None => {
                    warn!(
                        event_name = "turn.unknown_function",
                        function = %call.name,
                        "assistant requested a function not in the catalog"
                    );
                }
                Some(Ok(output)) => {
                    info!(
                        event_name = "turn.function_called",
                        function = %call.name,
                        arguments = %call.arguments,
                    );
                    outputs.push(ToolOutput { tool_call_id: call.id.clone(), output });
                }
                Some(Err(err)) => {
                    error!(
                        event_name = "turn.function_failed",
                        function = %call.name,
                        error = %err,
                    );
                }
            }
        }

        outputs
    }
}
