use std::sync::Arc;
use std::time::Duration;

use bookly_agent::{
    AssistantEngine, EngineError, OpenAiAssistantEngine, PolicyAssistant, SessionManager,
    TurnPolicy, TurnRunner,
};
use bookly_core::config::{AppConfig, ConfigError, LoadOptions};
use bookly_functions::{standard_catalog, FunctionContext, FunctionError, PolicyResponder};
use bookly_sheets::{GoogleSheetsClient, SheetStore, StoreError};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub sessions: Arc<SessionManager>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("assistant engine client failed to initialize: {0}")]
    Engine(#[source] EngineError),
    #[error("sheets client failed to initialize: {0}")]
    Sheets(#[source] StoreError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Wires the full request path: OpenAI engine, sheets store, function
/// catalog, turn runner and session manager.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let engine: Arc<dyn AssistantEngine> =
        Arc::new(OpenAiAssistantEngine::new(&config.engine).map_err(BootstrapError::Engine)?);
    let store: Arc<dyn SheetStore> =
        Arc::new(GoogleSheetsClient::new(&config.sheets).map_err(BootstrapError::Sheets)?);

    let turn_policy = TurnPolicy {
        max_iterations: config.engine.max_poll_iterations,
        poll_interval: Duration::from_secs(config.engine.poll_interval_secs),
        moderate_input: true,
    };

    let policy: Arc<dyn PolicyResponder> = match config.assistants.policy_assistant() {
        Some(assistant_id) => Arc::new(PolicyAssistant::new(
            Arc::clone(&engine),
            assistant_id.to_string(),
            turn_policy,
        )),
        None => {
            warn!(
                event_name = "system.bootstrap.policy_assistant_missing",
                "no policy assistant configured; policy questions will fail"
            );
            Arc::new(UnconfiguredPolicy)
        }
    };

    let context = FunctionContext {
        store,
        booking_spreadsheet_id: config.sheets.booking_spreadsheet_id.clone(),
        price_list_spreadsheet_id: config.sheets.price_list_spreadsheet_id.clone(),
        policy,
    };
    let catalog = standard_catalog(&context);

    let runner = Arc::new(TurnRunner::new(Arc::clone(&engine), catalog, turn_policy));
    let sessions = Arc::new(SessionManager::new(engine, runner, config.assistants.clone()));

    info!(
        event_name = "system.bootstrap.ready",
        assistants = config.assistants.len(),
        "application bootstrap complete"
    );

    Ok(Application { config, sessions })
}

/// Stand-in used when no policy assistant id is configured. Handlers that
/// need it surface the failure instead of silently answering.
struct UnconfiguredPolicy;

#[async_trait::async_trait]
impl PolicyResponder for UnconfiguredPolicy {
    async fn answer(&self, _prompt: &str) -> Result<String, FunctionError> {
        Err(FunctionError::Policy("service policy assistant is not configured".to_string()))
    }
}
