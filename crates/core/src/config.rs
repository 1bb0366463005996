use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::ServiceCategory;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub sheets: SheetsConfig,
    pub assistants: AssistantDirectory,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub max_poll_iterations: u32,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub access_token: SecretString,
    pub base_url: String,
    pub booking_spreadsheet_id: String,
    pub price_list_spreadsheet_id: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub chat_port: u16,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Per-category assistant credentials, collected once at startup. Session
/// construction receives this by reference; nothing looks up assistant IDs
/// ad hoc after load.
#[derive(Clone, Debug, Default)]
pub struct AssistantDirectory {
    ids: HashMap<ServiceCategory, String>,
    policy_assistant_id: Option<String>,
}

impl AssistantDirectory {
    pub fn get(&self, category: ServiceCategory) -> Option<&str> {
        self.ids.get(&category).map(String::as_str)
    }

    pub fn set(&mut self, category: ServiceCategory, assistant_id: String) {
        self.ids.insert(category, assistant_id);
    }

    /// Assistant used for service-policy questions, shared across categories.
    pub fn policy_assistant(&self) -> Option<&str> {
        self.policy_assistant_id.as_deref()
    }

    pub fn set_policy_assistant(&mut self, assistant_id: String) {
        self.policy_assistant_id = Some(assistant_id);
    }

    /// Categories without a configured credential, for readiness reporting.
    pub fn missing(&self) -> Vec<ServiceCategory> {
        ServiceCategory::ALL
            .into_iter()
            .filter(|category| !self.ids.contains_key(category))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub engine_api_key: Option<String>,
    pub sheets_access_token: Option<String>,
    pub booking_spreadsheet_id: Option<String>,
    pub price_list_spreadsheet_id: Option<String>,
    pub log_level: Option<String>,
    pub assistant_ids: Vec<(ServiceCategory, String)>,
    pub policy_assistant_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                api_key: String::new().into(),
                base_url: "https://api.openai.com/v1".to_string(),
                timeout_secs: 30,
                poll_interval_secs: 3,
                max_poll_iterations: 10,
            },
            sheets: SheetsConfig {
                access_token: String::new().into(),
                base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
                booking_spreadsheet_id: String::new(),
                price_list_spreadsheet_id: String::new(),
                timeout_secs: 30,
            },
            assistants: AssistantDirectory::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                chat_port: 8090,
                health_check_port: 8080,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bookly.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(engine) = patch.engine {
            if let Some(engine_api_key_value) = engine.api_key {
                self.engine.api_key = secret_value(engine_api_key_value);
            }
            if let Some(base_url) = engine.base_url {
                self.engine.base_url = base_url;
            }
            if let Some(timeout_secs) = engine.timeout_secs {
                self.engine.timeout_secs = timeout_secs;
            }
            if let Some(poll_interval_secs) = engine.poll_interval_secs {
                self.engine.poll_interval_secs = poll_interval_secs;
            }
            if let Some(max_poll_iterations) = engine.max_poll_iterations {
                self.engine.max_poll_iterations = max_poll_iterations;
            }
        }

        if let Some(sheets) = patch.sheets {
            if let Some(sheets_token_value) = sheets.access_token {
                self.sheets.access_token = secret_value(sheets_token_value);
            }
            if let Some(base_url) = sheets.base_url {
                self.sheets.base_url = base_url;
            }
            if let Some(booking_spreadsheet_id) = sheets.booking_spreadsheet_id {
                self.sheets.booking_spreadsheet_id = booking_spreadsheet_id;
            }
            if let Some(price_list_spreadsheet_id) = sheets.price_list_spreadsheet_id {
                self.sheets.price_list_spreadsheet_id = price_list_spreadsheet_id;
            }
            if let Some(timeout_secs) = sheets.timeout_secs {
                self.sheets.timeout_secs = timeout_secs;
            }
        }

        if let Some(assistants) = patch.assistants {
            for (key, assistant_id) in assistants {
                if key == "policy" {
                    self.assistants.set_policy_assistant(assistant_id);
                    continue;
                }
                let category = key.parse::<ServiceCategory>().map_err(|_| {
                    ConfigError::Validation(format!(
                        "unknown service category `{key}` in [assistants]"
                    ))
                })?;
                self.assistants.set(category, assistant_id);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(chat_port) = server.chat_port {
                self.server.chat_port = chat_port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOOKLY_ENGINE_API_KEY") {
            self.engine.api_key = secret_value(value);
        }
        if let Some(value) = read_env("BOOKLY_ENGINE_BASE_URL") {
            self.engine.base_url = value;
        }
        if let Some(value) = read_env("BOOKLY_ENGINE_TIMEOUT_SECS") {
            self.engine.timeout_secs = parse_u64("BOOKLY_ENGINE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("BOOKLY_ENGINE_POLL_INTERVAL_SECS") {
            self.engine.poll_interval_secs =
                parse_u64("BOOKLY_ENGINE_POLL_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("BOOKLY_ENGINE_MAX_POLL_ITERATIONS") {
            self.engine.max_poll_iterations =
                parse_u32("BOOKLY_ENGINE_MAX_POLL_ITERATIONS", &value)?;
        }

        if let Some(value) = read_env("BOOKLY_SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = secret_value(value);
        }
        if let Some(value) = read_env("BOOKLY_SHEETS_BASE_URL") {
            self.sheets.base_url = value;
        }
        if let Some(value) = read_env("BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID") {
            self.sheets.booking_spreadsheet_id = value;
        }
        if let Some(value) = read_env("BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID") {
            self.sheets.price_list_spreadsheet_id = value;
        }
        if let Some(value) = read_env("BOOKLY_SHEETS_TIMEOUT_SECS") {
            self.sheets.timeout_secs = parse_u64("BOOKLY_SHEETS_TIMEOUT_SECS", &value)?;
        }

        // Per-category credentials keep their historical env names.
        for category in ServiceCategory::ALL {
            if let Some(value) = read_env(category.assistant_env_key()) {
                self.assistants.set(category, value);
            }
        }
        if let Some(value) = read_env("SERVICE_POLICY_ASSISTANT_ID") {
            self.assistants.set_policy_assistant(value);
        }

        if let Some(value) = read_env("BOOKLY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("BOOKLY_SERVER_CHAT_PORT") {
            self.server.chat_port = parse_u16("BOOKLY_SERVER_CHAT_PORT", &value)?;
        }
        if let Some(value) = read_env("BOOKLY_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("BOOKLY_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        let log_level = read_env("BOOKLY_LOGGING_LEVEL").or_else(|| read_env("BOOKLY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BOOKLY_LOGGING_FORMAT").or_else(|| read_env("BOOKLY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(engine_api_key) = overrides.engine_api_key {
            self.engine.api_key = secret_value(engine_api_key);
        }
        if let Some(sheets_access_token) = overrides.sheets_access_token {
            self.sheets.access_token = secret_value(sheets_access_token);
        }
        if let Some(booking_spreadsheet_id) = overrides.booking_spreadsheet_id {
            self.sheets.booking_spreadsheet_id = booking_spreadsheet_id;
        }
        if let Some(price_list_spreadsheet_id) = overrides.price_list_spreadsheet_id {
            self.sheets.price_list_spreadsheet_id = price_list_spreadsheet_id;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        for (category, assistant_id) in overrides.assistant_ids {
            self.assistants.set(category, assistant_id);
        }
        if let Some(policy_assistant_id) = overrides.policy_assistant_id {
            self.assistants.set_policy_assistant(policy_assistant_id);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        validate_sheets(&self.sheets)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bookly.toml"), PathBuf::from("config/bookly.toml")]
        .into_iter()
        .find(|path| path.exists())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    engine: Option<EnginePatch>,
    sheets: Option<SheetsPatch>,
    assistants: Option<HashMap<String, String>>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    max_poll_iterations: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetsPatch {
    access_token: Option<String>,
    base_url: Option<String>,
    booking_spreadsheet_id: Option<String>,
    price_list_spreadsheet_id: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    chat_port: Option<u16>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    let api_key = engine.api_key.expose_secret();
    if api_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "engine.api_key is required (BOOKLY_ENGINE_API_KEY)".to_string(),
        ));
    }

    if !engine.base_url.starts_with("http://") && !engine.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "engine.base_url must start with http:// or https://".to_string(),
        ));
    }

    if engine.timeout_secs == 0 || engine.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "engine.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if engine.poll_interval_secs == 0 || engine.poll_interval_secs > 60 {
        return Err(ConfigError::Validation(
            "engine.poll_interval_secs must be in range 1..=60".to_string(),
        ));
    }

    if engine.max_poll_iterations == 0 || engine.max_poll_iterations > 100 {
        return Err(ConfigError::Validation(
            "engine.max_poll_iterations must be in range 1..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_sheets(sheets: &SheetsConfig) -> Result<(), ConfigError> {
    if sheets.access_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "sheets.access_token is required (BOOKLY_SHEETS_ACCESS_TOKEN)".to_string(),
        ));
    }

    if !sheets.base_url.starts_with("http://") && !sheets.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "sheets.base_url must start with http:// or https://".to_string(),
        ));
    }

    if sheets.booking_spreadsheet_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sheets.booking_spreadsheet_id is required (BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID)"
                .to_string(),
        ));
    }

    if sheets.price_list_spreadsheet_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sheets.price_list_spreadsheet_id is required \
             (BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID)"
                .to_string(),
        ));
    }

    if sheets.timeout_secs == 0 || sheets.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "sheets.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.chat_port == 0 {
        return Err(ConfigError::Validation(
            "server.chat_port must be greater than zero".to_string(),
        ));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.chat_port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.chat_port and server.health_check_port must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
