use bookly_core::config::{AppConfig, LoadOptions};
use bookly_core::ServiceCategory;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_assistant_directory(&config));
            checks.push(check_policy_assistant(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "assistant_directory",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "policy_assistant",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_assistant_directory(config: &AppConfig) -> DoctorCheck {
    let missing = config.assistants.missing();
    if missing.is_empty() {
        DoctorCheck {
            name: "assistant_directory",
            status: CheckStatus::Pass,
            details: format!(
                "all {} service categories have assistant credentials",
                ServiceCategory::ALL.len()
            ),
        }
    } else {
        let names: Vec<&str> = missing.iter().map(|category| category.label()).collect();
        DoctorCheck {
            name: "assistant_directory",
            status: CheckStatus::Fail,
            details: format!("missing assistant ids for: {}", names.join(", ")),
        }
    }
}

fn check_policy_assistant(config: &AppConfig) -> DoctorCheck {
    if config.assistants.policy_assistant().is_some() {
        DoctorCheck {
            name: "policy_assistant",
            status: CheckStatus::Pass,
            details: "service policy assistant configured".to_string(),
        }
    } else {
        DoctorCheck {
            name: "policy_assistant",
            status: CheckStatus::Fail,
            details: "SERVICE_POLICY_ASSISTANT_ID is not set".to_string(),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
