use std::env;
use std::sync::{Mutex, OnceLock};

use bookly_cli::commands::{config, doctor};
use serde_json::Value;

const FULL_ENV: &[(&str, &str)] = &[
    ("BOOKLY_ENGINE_API_KEY", "sk-test"),
    ("BOOKLY_SHEETS_ACCESS_TOKEN", "ya29-test"),
    ("BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID", "booking-sheet"),
    ("BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID", "price-sheet"),
    ("AIRCON_CLEANING_ASSISTANT_ID", "asst_ac"),
    ("AIRCON_INSTALLATION_ASSISTANT_ID", "asst_ai"),
    ("AIRCON_TROUBLESHOOTING_ASSISTANT_ID", "asst_at"),
    ("APPLIANCE_REPAIR_ASSISTANT_ID", "asst_ar"),
    ("CURTAIN_MAKING_ASSISTANT_ID", "asst_cm"),
    ("ELECTRICAL_ASSISTANT_ID", "asst_el"),
    ("HOME_CLEANING_ASSISTANT_ID", "asst_hc"),
    ("LAUNDRY_ASSISTANT_ID", "asst_la"),
    ("LOCKSMITH_ASSISTANT_ID", "asst_lo"),
    ("OTHERS_ASSISTANT_ID", "asst_ot"),
    ("PLUMBING_ASSISTANT_ID", "asst_pl"),
    ("PEST_CONTROL_ASSISTANT_ID", "asst_pc"),
    ("RENOVATION_ASSISTANT_ID", "asst_re"),
    ("UPHOLSTERY_CLEANING_ASSISTANT_ID", "asst_uc"),
    ("SERVICE_POLICY_ASSISTANT_ID", "asst_policy"),
];

#[test]
fn doctor_passes_with_full_credentials() {
    with_env(FULL_ENV, || {
        let output = doctor::run(true);
        let payload: Value =
            serde_json::from_str(&output).expect("doctor output should be valid JSON");

        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "assistant_directory");
        assert_eq!(payload["checks"][1]["status"], "pass");
        assert_eq!(payload["checks"][2]["name"], "policy_assistant");
        assert_eq!(payload["checks"][2]["status"], "pass");
    });
}

#[test]
fn doctor_names_missing_assistant_categories() {
    with_env(
        &[
            ("BOOKLY_ENGINE_API_KEY", "sk-test"),
            ("BOOKLY_SHEETS_ACCESS_TOKEN", "ya29-test"),
            ("BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID", "booking-sheet"),
            ("BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID", "price-sheet"),
            ("HOME_CLEANING_ASSISTANT_ID", "asst_hc"),
        ],
        || {
            let output = doctor::run(true);
            let payload: Value =
                serde_json::from_str(&output).expect("doctor output should be valid JSON");

            assert_eq!(payload["overall_status"], "fail");
            assert_eq!(payload["checks"][1]["status"], "fail");
            let details = payload["checks"][1]["details"].as_str().unwrap_or("");
            assert!(details.contains("Locksmith"));
            assert!(!details.contains("Home Cleaning"));
        },
    );
}

#[test]
fn doctor_skips_credential_checks_when_config_invalid() {
    with_env(&[], || {
        let output = doctor::run(false);

        assert!(output.starts_with("doctor: one or more readiness checks failed"));
        assert!(output.contains("- [fail] config_validation"));
        assert!(output.contains("- [skip] assistant_directory"));
        assert!(output.contains("- [skip] policy_assistant"));
    });
}

#[test]
fn config_redacts_secrets_and_attributes_env_sources() {
    with_env(FULL_ENV, || {
        let output = config::run();

        assert!(output.contains("engine.api_key = sk-*** (source: env (BOOKLY_ENGINE_API_KEY))"));
        assert!(output.contains("sheets.access_token = ya29-***"));
        assert!(!output.contains("sk-test"));
        assert!(output.contains("assistants.configured = 14 of 14"));
        assert!(output.contains("assistants.policy = <redacted>"));
        assert!(output.contains("server.chat_port = 8090 (source: default)"));
    });
}

#[test]
fn config_reports_validation_failure_without_credentials() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed:"));
    });
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "BOOKLY_ENGINE_API_KEY",
        "BOOKLY_ENGINE_BASE_URL",
        "BOOKLY_ENGINE_TIMEOUT_SECS",
        "BOOKLY_ENGINE_POLL_INTERVAL_SECS",
        "BOOKLY_ENGINE_MAX_POLL_ITERATIONS",
        "BOOKLY_SHEETS_ACCESS_TOKEN",
        "BOOKLY_SHEETS_BASE_URL",
        "BOOKLY_SHEETS_BOOKING_SPREADSHEET_ID",
        "BOOKLY_SHEETS_PRICE_LIST_SPREADSHEET_ID",
        "BOOKLY_SHEETS_TIMEOUT_SECS",
        "BOOKLY_SERVER_BIND_ADDRESS",
        "BOOKLY_SERVER_CHAT_PORT",
        "BOOKLY_SERVER_HEALTH_CHECK_PORT",
        "BOOKLY_LOGGING_LEVEL",
        "BOOKLY_LOGGING_FORMAT",
        "BOOKLY_LOG_LEVEL",
        "BOOKLY_LOG_FORMAT",
        "AIRCON_CLEANING_ASSISTANT_ID",
        "AIRCON_INSTALLATION_ASSISTANT_ID",
        "AIRCON_TROUBLESHOOTING_ASSISTANT_ID",
        "APPLIANCE_REPAIR_ASSISTANT_ID",
        "CURTAIN_MAKING_ASSISTANT_ID",
        "ELECTRICAL_ASSISTANT_ID",
        "HOME_CLEANING_ASSISTANT_ID",
        "LAUNDRY_ASSISTANT_ID",
        "LOCKSMITH_ASSISTANT_ID",
        "OTHERS_ASSISTANT_ID",
        "PLUMBING_ASSISTANT_ID",
        "PEST_CONTROL_ASSISTANT_ID",
        "RENOVATION_ASSISTANT_ID",
        "UPHOLSTERY_CLEANING_ASSISTANT_ID",
        "SERVICE_POLICY_ASSISTANT_ID",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
