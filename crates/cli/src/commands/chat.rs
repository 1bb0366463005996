use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use bookly_agent::{
    AssistantEngine, OpenAiAssistantEngine, PolicyAssistant, SessionManager, TurnPolicy,
    TurnRunner,
};
use bookly_core::config::{AppConfig, LoadOptions};
use bookly_core::{Language, ServiceCategory};
use bookly_functions::{standard_catalog, FunctionContext, FunctionError, PolicyResponder};
use bookly_sheets::{GoogleSheetsClient, SheetStore};

use super::CommandResult;

/// Terminal conversation with one service assistant. Reads customer lines
/// from stdin until EOF or an exit word.
pub fn run(service: &str, language: &str) -> CommandResult {
    let category: ServiceCategory = match service.parse() {
        Ok(category) => category,
        Err(error) => return CommandResult::failure("chat", "unknown_service", error.to_string(), 2),
    };
    // Unknown language names fall back to English.
    let language: Language = language.parse().unwrap_or_default();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("chat", "config_validation", error.to_string(), 2)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let sessions = match build_session_manager(&config) {
        Ok(sessions) => sessions,
        Err(message) => return CommandResult::failure("chat", "client_init", message, 3),
    };

    let outcome = runtime.block_on(async {
        let (session, greeting) = sessions
            .open_session(category, language)
            .await
            .map_err(|error| error.to_string())?;
        println!("assistant> {greeting}");

        let stdin = io::stdin();
        print!("you> ");
        let _ = io::stdout().flush();
        for line in stdin.lock().lines() {
            let line = line.map_err(|error| format!("failed to read input: {error}"))?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
                break;
            }

            let reply = sessions
                .send_message(session.id, text)
                .await
                .map_err(|error| error.to_string())?;
            println!("assistant> {reply}");
            print!("you> ");
            let _ = io::stdout().flush();
        }

        sessions.close_session(session.id).await;
        Ok::<(), String>(())
    });

    match outcome {
        Ok(()) => CommandResult::success("chat", format!("chat session for {category} ended")),
        Err(message) => CommandResult::failure("chat", "session", message, 4),
    }
}

fn build_session_manager(config: &AppConfig) -> Result<Arc<SessionManager>, String> {
    let engine: Arc<dyn AssistantEngine> = Arc::new(
        OpenAiAssistantEngine::new(&config.engine)
            .map_err(|error| format!("assistant engine client failed to initialize: {error}"))?,
    );
    let store: Arc<dyn SheetStore> = Arc::new(
        GoogleSheetsClient::new(&config.sheets)
            .map_err(|error| format!("sheets client failed to initialize: {error}"))?,
    );

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
        None => Arc::new(UnconfiguredPolicy),
    };

    let context = FunctionContext {
        store,
        booking_spreadsheet_id: config.sheets.booking_spreadsheet_id.clone(),
        price_list_spreadsheet_id: config.sheets.price_list_spreadsheet_id.clone(),
        policy,
    };
    let catalog = standard_catalog(&context);
    let runner = Arc::new(TurnRunner::new(Arc::clone(&engine), catalog, turn_policy));

    Ok(Arc::new(SessionManager::new(engine, runner, config.assistants.clone())))
}

struct UnconfiguredPolicy;

#[async_trait::async_trait]
impl PolicyResponder for UnconfiguredPolicy {
    async fn answer(&self, _prompt: &str) -> Result<String, FunctionError> {
        Err(FunctionError::Policy("service policy assistant is not configured".to_string()))
    }
}
