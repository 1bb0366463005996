use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use bookly_core::config::AssistantDirectory;
use bookly_core::dates::{earliest_available_date, parse_service_date, WeekClosure, SERVICE_DATE_FORMAT};
use bookly_core::{Language, ServiceCategory};
use bookly_functions::{FunctionCatalog, FunctionError, PolicyResponder};

use crate::engine::{AssistantEngine, EngineError};
use crate::runloop::{TurnPolicy, TurnRunner};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no assistant is configured for {0}")]
    MissingAssistant(ServiceCategory),
    #[error("unknown session {0}")]
    UnknownSession(Uuid),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    Customer,
    Assistant,
}

#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// One customer conversation: a category and language pick bound to a
/// dedicated assistant thread. Changing either starts a new session.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub category: ServiceCategory,
    pub language: Language,
    pub thread_id: String,
    pub assistant_id: String,
    pub transcript: Vec<TranscriptEntry>,
}

pub struct SessionManager {
    engine: Arc<dyn AssistantEngine>,
    runner: Arc<TurnRunner>,
    assistants: AssistantDirectory,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionManager {
    pub fn new(
        engine: Arc<dyn AssistantEngine>,
        runner: Arc<TurnRunner>,
        assistants: AssistantDirectory,
    ) -> Self {
        Self { engine, runner, assistants, sessions: Mutex::new(HashMap::new()) }
    }

    /// Starts a session: refreshes the assistant's instruction dates, opens
    /// a thread and sends the language-appropriate opening prompt. Returns
    /// the session and the assistant's greeting.
    pub async fn open_session(
        &self,
        category: ServiceCategory,
        language: Language,
    ) -> Result<(Session, String), SessionError> {
        let assistant_id = self
            .assistants
            .get(category)
            .ok_or(SessionError::MissingAssistant(category))?
            .to_string();

        self.refresh_instructions(&assistant_id, category).await;

        let thread_id = self.engine.create_thread().await?;
        info!(event_name = "session.thread_created", %category, thread_id = %thread_id);

        let greeting =
            self.runner.run_turn(&thread_id, &assistant_id, language.opening_prompt()).await;

        let session = Session {
            id: Uuid::new_v4(),
            category,
            language,
            thread_id,
            assistant_id,
            transcript: vec![
                TranscriptEntry {
                    speaker: Speaker::Customer,
                    text: language.opening_prompt().to_string(),
                },
                TranscriptEntry { speaker: Speaker::Assistant, text: greeting.clone() },
            ],
        };
        self.sessions.lock().await.insert(session.id, session.clone());

        Ok((session, greeting))
    }

    pub async fn send_message(
        &self,
        session_id: Uuid,
        text: &str,
    ) -> Result<String, SessionError> {
        let (thread_id, assistant_id) = {
            let sessions = self.sessions.lock().await;
            let session = sessions
                .get(&session_id)
                .ok_or(SessionError::UnknownSession(session_id))?;
            (session.thread_id.clone(), session.assistant_id.clone())
        };

        let reply = self.runner.run_turn(&thread_id, &assistant_id, text).await;

        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&session_id) {
            session
                .transcript
                .push(TranscriptEntry { speaker: Speaker::Customer, text: text.to_string() });
            session
                .transcript
                .push(TranscriptEntry { speaker: Speaker::Assistant, text: reply.clone() });
        }

        Ok(reply)
    }

    pub async fn session(&self, session_id: Uuid) -> Option<Session> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    pub async fn close_session(&self, session_id: Uuid) -> bool {
        self.sessions.lock().await.remove(&session_id).is_some()
    }

    /// Keeps the "today is ..." and "earliest available date ..." anchors in
    /// the assistant's instructions current. Failures are logged and the
    /// session proceeds with stale dates, matching a best-effort refresh.
    async fn refresh_instructions(&self, assistant_id: &str, category: ServiceCategory) {
        let instructions = match self.engine.assistant_instructions(assistant_id).await {
            Ok(instructions) => instructions,
            Err(err) => {
                error!(event_name = "session.instructions_fetch_failed", error = %err);
                return;
            }
        };

        let today = Local::now().date_naive();
        let Some(updated) = refreshed_instructions(&instructions, category, today) else {
            return;
        };

        match self.engine.update_assistant_instructions(assistant_id, &updated).await {
            Ok(()) => info!(event_name = "session.instructions_refreshed", %category),
            Err(err) => {
                error!(event_name = "session.instructions_update_failed", error = %err);
            }
        }
    }
}

/// Answers policy questions through a dedicated assistant on a throwaway
/// thread. No functions are exposed to it and its prompt skips moderation,
/// since the prompt is composed by us rather than typed by the customer.
pub struct PolicyAssistant {
    engine: Arc<dyn AssistantEngine>,
    runner: TurnRunner,
    assistant_id: String,
}

impl PolicyAssistant {
    pub fn new(
        engine: Arc<dyn AssistantEngine>,
        assistant_id: String,
        mut policy: TurnPolicy,
    ) -> Self {
        policy.moderate_input = false;
        let runner = TurnRunner::new(Arc::clone(&engine), FunctionCatalog::new(), policy);
        Self { engine, runner, assistant_id }
    }
}

#[async_trait]
impl PolicyResponder for PolicyAssistant {
    async fn answer(&self, prompt: &str) -> Result<String, FunctionError> {
        let thread_id = self
            .engine
            .create_thread()
            .await
            .map_err(|err| FunctionError::Policy(err.to_string()))?;

        match self.runner.try_run_turn(&thread_id, &self.assistant_id, prompt).await {
            Ok(reply) => Ok(reply),
            Err(EngineError::EmptyResponse) => {
                Ok("Error: No response from the assistant.".to_string())
            }
            Err(err) => Err(FunctionError::Policy(err.to_string())),
        }
    }
}

/// Rewrites the two date anchors in assistant instructions, or returns
/// `None` when nothing needs changing. The instructions are expected to
/// carry exactly two `DD-Mon-YYYY` dates: today's date (prefixed by its
/// weekday) and the earliest available date (suffixed by its weekday in
/// parentheses).
pub(crate) fn refreshed_instructions(
    instructions: &str,
    category: ServiceCategory,
    today: NaiveDate,
) -> Option<String> {
    let anchors = find_instruction_dates(instructions);
    let [old_today, old_earliest] = anchors.as_slice() else {
        return None;
    };

    let today_str = today.format(SERVICE_DATE_FORMAT).to_string();
    if *old_today == today_str {
        return None;
    }

    let old_today_date = parse_service_date(old_today).ok()?;
    let old_earliest_date = parse_service_date(old_earliest).ok()?;

    let closure = match category {
        ServiceCategory::HomeCleaning | ServiceCategory::Others => WeekClosure::FullWeekend,
        _ => WeekClosure::SundayOnly,
    };
    let new_earliest = earliest_available_date(today, closure);

    let updated = instructions
        .replace(
            &format!("{}, {old_today}", old_today_date.format("%A")),
            &format!("{}, {today_str}", today.format("%A")),
        )
        .replace(
            &format!("{old_earliest} ({})", old_earliest_date.format("%A")),
            &format!(
                "{} ({})",
                new_earliest.format(SERVICE_DATE_FORMAT),
                new_earliest.format("%A")
            ),
        );

    Some(updated)
}

/// Finds `DD-Mon-YYYY` tokens at word boundaries. The pattern is all ASCII,
/// so byte scanning keeps slices valid.
fn find_instruction_dates(text: &str) -> Vec<String> {
    const LEN: usize = 11;
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i + LEN <= bytes.len() {
        let starts_word = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let ends_word = i + LEN == bytes.len() || !bytes[i + LEN].is_ascii_alphanumeric();

        if starts_word
            && ends_word
            && bytes[i].is_ascii_digit()
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2] == b'-'
            && bytes[i + 3].is_ascii_alphabetic()
            && bytes[i + 4].is_ascii_alphabetic()
            && bytes[i + 5].is_ascii_alphabetic()
            && bytes[i + 6] == b'-'
            && bytes[i + 7..i + 11].iter().all(u8::is_ascii_digit)
        {
            found.push(text[i..i + LEN].to_string());
            i += LEN;
        } else {
            i += 1;
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const INSTRUCTIONS: &str = "You are a booking assistant. Today is Wednesday, 26-Aug-2026. \
         The earliest available service date is 28-Aug-2026 (Friday). Collect all details.";

    #[test]
    fn date_scan_finds_both_anchors() {
        let found = find_instruction_dates(INSTRUCTIONS);
        assert_eq!(found, vec!["26-Aug-2026".to_string(), "28-Aug-2026".to_string()]);
    }

    #[test]
    fn stale_anchors_are_rewritten_for_sunday_closed_categories() {
        // Wednesday; the next four calendar days contain no Sunday, so the
        // earliest slot is two days out.
        let today = date(2026, 9, 2);
        let updated =
            refreshed_instructions(INSTRUCTIONS, ServiceCategory::Plumbing, today).unwrap();

        assert!(updated.contains("Today is Wednesday, 02-Sep-2026."));
        assert!(updated.contains("earliest available service date is 04-Sep-2026 (Friday)"));
    }

    #[test]
    fn weekend_closed_categories_skip_saturday_and_sunday() {
        let today = date(2026, 9, 2);
        let updated =
            refreshed_instructions(INSTRUCTIONS, ServiceCategory::HomeCleaning, today).unwrap();

        assert!(updated.contains("earliest available service date is 07-Sep-2026 (Monday)"));
    }

    #[test]
    fn current_instructions_are_left_alone() {
        let today = date(2026, 8, 26);
        assert!(refreshed_instructions(INSTRUCTIONS, ServiceCategory::Plumbing, today).is_none());
    }

    #[test]
    fn unexpected_anchor_counts_are_ignored() {
        let today = date(2026, 9, 2);
        let one_date = "Today is 26-Aug-2026.";
        assert!(refreshed_instructions(one_date, ServiceCategory::Plumbing, today).is_none());
    }
}
