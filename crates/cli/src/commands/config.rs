use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bookly_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let api_key = redact_token(config.engine.api_key.expose_secret());
    lines.push(render_line(
        "engine.api_key",
        &api_key,
        field_source(
            "engine.api_key",
            Some("BOOKLY_ENGINE_API_KEY"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "engine.base_url",
        &config.engine.base_url,
        field_source(
            "engine.base_url",
            Some("BOOKLY_ENGINE_BASE_URL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "engine.timeout_secs",
        &config.engine.timeout_secs.to_string(),
        field_source(
            "engine.timeout_secs",
            Some("BOOKLY_ENGINE_TIMEOUT_SECS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "engine.poll_interval_secs",
        &config.engine.poll_interval_secs.to_string(),
        field_source(
            "engine.poll_interval_secs",
            Some("BOOKLY_ENGINE_POLL_INTERVAL_SECS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "engine.max_poll_iterations",
        &config.engine.max_poll_iterations.to_string(),
        field_source(
            "engine.max_poll_iterations",
            Some("BOOKLY_ENGINE_MAX_POLL_ITERATIONS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    let access_token = redact_token(config.sheets.access_token.expose_secret());
    lines.push(render_line(
        "sheets.access_token",
        &access_token,
        field_source(
            "sheets.access_token",
            Some("BOOKLY_SHEETS_ACCESS_TOKEN"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "sheets.base_url",
        &config.sheets.base_url,
        field_source(
            "sheets.base_url",
            Some("BOOKLY_SHEETS_BASE_URL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "sheets.booking_spreadsheet_id",
        &config.sheets.booking_spreadsheet_id,
        field_source(
            "sheets.booking_spreadsheet_id",
            Some("BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "sheets.price_list_spreadsheet_id",
        &config.sheets.price_list_spreadsheet_id,
        field_source(
            "sheets.price_list_spreadsheet_id",
            Some("BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "assistants.configured",
        &format!("{} of {}", config.assistants.len(), bookly_core::ServiceCategory::ALL.len()),
        "derived".to_string(),
    ));
    let policy_assistant =
        if config.assistants.policy_assistant().is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "assistants.policy",
        policy_assistant,
        field_source(
            "assistants.policy",
            Some("SERVICE_POLICY_ASSISTANT_ID"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        field_source(
            "server.bind_address",
            Some("BOOKLY_SERVER_BIND_ADDRESS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "server.chat_port",
        &config.server.chat_port.to_string(),
        field_source(
            "server.chat_port",
            Some("BOOKLY_SERVER_CHAT_PORT"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
        field_source(
            "server.health_check_port",
            Some("BOOKLY_SERVER_HEALTH_CHECK_PORT"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            Some("BOOKLY_LOGGING_LEVEL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            Some("BOOKLY_LOGGING_FORMAT"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("bookly.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/bookly.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
