//! HTTP surface for customer conversations. One session per service pick;
//! every message rides the session's assistant thread.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use bookly_agent::{SessionError, SessionManager};
use bookly_core::{Language, ServiceCategory};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatState {
    sessions: Arc<SessionManager>,
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub service: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
    pub service: String,
    pub language: Language,
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageReply {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ChatError {
    UnknownService(String),
    Session(SessionError),
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownService(_) => StatusCode::BAD_REQUEST,
            Self::Session(SessionError::UnknownSession(_)) => StatusCode::NOT_FOUND,
            Self::Session(SessionError::MissingAssistant(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Session(SessionError::Engine(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::UnknownService(service) => format!("unknown service: {service}"),
            Self::Session(error) => error.to_string(),
        }
    }
}

impl From<SessionError> for ChatError {
    fn from(error: SessionError) -> Self {
        Self::Session(error)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody { error: self.message() };
        if status.is_server_error() {
            error!(event_name = "chat.request_failed", status = status.as_u16(), error = %body.error);
        }
        (status, Json(body)).into_response()
    }
}

pub fn router(sessions: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/{id}/messages", post(send_message))
        .route("/sessions/{id}", delete(close_session))
        .with_state(ChatState { sessions })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    sessions: Arc<SessionManager>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(event_name = "chat.listener_start", bind_address = %address, "chat endpoint started");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(sessions)).await {
            error!(
                event_name = "chat.listener_error",
                error = %error,
                "chat endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn open_session(
    State(state): State<ChatState>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionOpened>), ChatError> {
    let category: ServiceCategory = request
        .service
        .parse()
        .map_err(|_| ChatError::UnknownService(request.service.clone()))?;
    // Unknown language names fall back to English, so this parse cannot fail.
    let language: Language =
        request.language.as_deref().unwrap_or("English").parse().unwrap_or_default();

    let (session, greeting) = state.sessions.open_session(category, language).await?;

    info!(
        event_name = "chat.session_opened",
        session_id = %session.id,
        service = %category,
        "chat session opened"
    );

    Ok((
        StatusCode::CREATED,
        Json(SessionOpened {
            session_id: session.id,
            service: category.label().to_string(),
            language,
            greeting,
        }),
    ))
}

pub async fn send_message(
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageReply>, ChatError> {
    let reply = state.sessions.send_message(id, &request.text).await?;
    Ok(Json(MessageReply { reply }))
}

pub async fn close_session(
    State(state): State<ChatState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.sessions.close_session(id).await {
        info!(event_name = "chat.session_closed", session_id = %id, "chat session closed");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;
    use bookly_agent::{
        AssistantEngine, EngineError, RunHandle, RunStatus, SessionManager, ToolOutput,
        TurnPolicy, TurnRunner,
    };
    use bookly_core::config::AssistantDirectory;
    use bookly_core::ServiceCategory;
    use bookly_functions::FunctionCatalog;
    use uuid::Uuid;

    use super::{open_session, send_message, ChatState, MessageRequest, OpenSessionRequest};

    struct CannedEngine;

    #[async_trait]
    impl AssistantEngine for CannedEngine {
        async fn moderate(&self, _input: &str) -> Result<bool, EngineError> {
            Ok(false)
        }

        async fn create_thread(&self) -> Result<String, EngineError> {
            Ok("thread_test".to_string())
        }

        async fn add_user_message(
            &self,
            _thread_id: &str,
            _content: &str,
        ) -> Result<(), EngineError> {
            Ok(())
        }

        async fn create_run(
            &self,
            _thread_id: &str,
            _assistant_id: &str,
        ) -> Result<RunHandle, EngineError> {
            Ok(RunHandle { run_id: "run_test".to_string(), status: RunStatus::Completed })
        }

        async fn poll_run(&self, _thread_id: &str, _run_id: &str) -> Result<RunHandle, EngineError> {
            Ok(RunHandle { run_id: "run_test".to_string(), status: RunStatus::Completed })
        }

        async fn submit_tool_outputs(
            &self,
            _thread_id: &str,
            _run_id: &str,
            _outputs: Vec<ToolOutput>,
        ) -> Result<RunHandle, EngineError> {
            Ok(RunHandle { run_id: "run_test".to_string(), status: RunStatus::Completed })
        }

        async fn latest_assistant_message(
            &self,
            _thread_id: &str,
            _run_id: &str,
        ) -> Result<Option<String>, EngineError> {
            Ok(Some("Hello! How can I help with your booking?".to_string()))
        }

        async fn assistant_instructions(&self, _assistant_id: &str) -> Result<String, EngineError> {
            Ok(String::new())
        }

        async fn update_assistant_instructions(
            &self,
            _assistant_id: &str,
            _instructions: &str,
        ) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn state_with(assistants: AssistantDirectory) -> ChatState {
        let engine = Arc::new(CannedEngine);
        let policy = TurnPolicy { poll_interval: std::time::Duration::ZERO, ..TurnPolicy::default() };
        let runner = Arc::new(TurnRunner::new(engine.clone(), FunctionCatalog::new(), policy));
        ChatState { sessions: Arc::new(SessionManager::new(engine, runner, assistants)) }
    }

    fn configured_directory() -> AssistantDirectory {
        let mut directory = AssistantDirectory::default();
        for category in ServiceCategory::ALL {
            directory.set(category, format!("asst_{}", category.config_key()));
        }
        directory
    }

    #[tokio::test]
    async fn open_session_returns_greeting_for_known_service() {
        let state = state_with(configured_directory());

        let (status, Json(payload)) = open_session(
            State(state),
            Json(OpenSessionRequest {
                service: "Plumbing".to_string(),
                language: Some("English".to_string()),
            }),
        )
        .await
        .expect("session should open");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload.service, "Plumbing");
        assert_eq!(payload.greeting, "Hello! How can I help with your booking?");
    }

    #[tokio::test]
    async fn open_session_rejects_unknown_service() {
        let state = state_with(configured_directory());

        let error = open_session(
            State(state),
            Json(OpenSessionRequest { service: "Dog Walking".to_string(), language: None }),
        )
        .await
        .err()
        .expect("unknown service should be rejected");

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.message().contains("Dog Walking"));
    }

    #[tokio::test]
    async fn open_session_reports_unconfigured_assistant() {
        let state = state_with(AssistantDirectory::default());

        let error = open_session(
            State(state),
            Json(OpenSessionRequest { service: "Laundry".to_string(), language: None }),
        )
        .await
        .err()
        .expect("missing assistant should be rejected");

        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn send_message_to_unknown_session_is_not_found() {
        let state = state_with(configured_directory());

        let error = send_message(
            State(state),
            Path(Uuid::new_v4()),
            Json(MessageRequest { text: "hello".to_string() }),
        )
        .await
        .err()
        .expect("unknown session should be rejected");

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
