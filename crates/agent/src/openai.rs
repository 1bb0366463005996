use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bookly_core::config::EngineConfig;

use crate::engine::{
    AssistantEngine, EngineError, RunHandle, RunStatus, ToolCallRequest, ToolOutput,
};

/// Assistants v2 client. One instance is shared across all sessions; threads
/// and runs are identified per call.
pub struct OpenAiAssistantEngine {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiAssistantEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "OpenAI-Beta",
            reqwest::header::HeaderValue::from_static("assistants=v2"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EngineError::Api { status: status.as_u16(), body })
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        response.json().await.map_err(|err| EngineError::Decode(err.to_string()))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, EngineError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;
        let response = Self::check(response).await?;
        response.json().await.map_err(|err| EngineError::Decode(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
}

#[derive(Debug, Deserialize)]
struct ThreadPayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    id: String,
    status: String,
    required_action: Option<RequiredAction>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    id: String,
    function: FunctionPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct AssistantPayload {
    #[serde(default)]
    instructions: Option<String>,
}

impl RunPayload {
    fn into_handle(self) -> Result<RunHandle, EngineError> {
        let status = match self.status.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => {
                let calls = self
                    .required_action
                    .ok_or_else(|| {
                        EngineError::Decode(
                            "requires_action run without required_action payload".to_string(),
                        )
                    })?
                    .submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCallRequest {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect();
                RunStatus::RequiresAction(calls)
            }
            "completed" => RunStatus::Completed,
            "cancelled" | "cancelling" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            // "failed", "incomplete" and anything future-unknown terminate
            // the run from our side.
            _ => RunStatus::Failed,
        };

        Ok(RunHandle { run_id: self.id, status })
    }
}

#[async_trait]
impl AssistantEngine for OpenAiAssistantEngine {
    async fn moderate(&self, input: &str) -> Result<bool, EngineError> {
        let response: ModerationResponse = self
            .post_json("/moderations", &serde_json::json!({ "input": input }))
            .await?;
        Ok(response.results.first().is_some_and(|result| result.flagged))
    }

    async fn create_thread(&self) -> Result<String, EngineError> {
        let thread: ThreadPayload =
            self.post_json("/threads", &serde_json::json!({})).await?;
        Ok(thread.id)
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), EngineError> {
        let _: serde_json::Value = self
            .post_json(
                &format!("/threads/{thread_id}/messages"),
                &serde_json::json!({ "role": "user", "content": content }),
            )
            .await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunHandle, EngineError> {
        let run: RunPayload = self
            .post_json(
                &format!("/threads/{thread_id}/runs"),
                &serde_json::json!({ "assistant_id": assistant_id }),
            )
            .await?;
        run.into_handle()
    }

    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<RunHandle, EngineError> {
        let run: RunPayload =
            self.get_json(&format!("/threads/{thread_id}/runs/{run_id}")).await?;
        run.into_handle()
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunHandle, EngineError> {
        let tool_outputs: Vec<_> = outputs
            .into_iter()
            .map(|output| {
                serde_json::json!({
                    "tool_call_id": output.tool_call_id,
                    "output": output.output,
                })
            })
            .collect();

        let run: RunPayload = self
            .post_json(
                &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
                &serde_json::json!({ "tool_outputs": tool_outputs }),
            )
            .await?;
        run.into_handle()
    }

    async fn latest_assistant_message(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Option<String>, EngineError> {
        let list: MessageList = self
            .get_json(&format!(
                "/threads/{thread_id}/messages?run_id={run_id}&order=desc&limit=1"
            ))
            .await?;

        let text = list
            .data
            .into_iter()
            .find(|message| message.role == "assistant")
            .and_then(|message| {
                message.content.into_iter().find_map(|part| match part {
                    ContentPart::Text { text } => Some(text.value),
                    ContentPart::Other => None,
                })
            });
        Ok(text)
    }

    async fn assistant_instructions(&self, assistant_id: &str) -> Result<String, EngineError> {
        let assistant: AssistantPayload =
            self.get_json(&format!("/assistants/{assistant_id}")).await?;
        Ok(assistant.instructions.unwrap_or_default())
    }

    async fn update_assistant_instructions(
        &self,
        assistant_id: &str,
        instructions: &str,
    ) -> Result<(), EngineError> {
        let _: serde_json::Value = self
            .post_json(
                &format!("/assistants/{assistant_id}"),
                &serde_json::json!({ "instructions": instructions }),
            )
            .await?;
        Ok(())
    }
}
