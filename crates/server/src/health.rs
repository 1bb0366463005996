use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use bookly_core::config::AssistantDirectory;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    assistants: AssistantDirectory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub assistants: HealthCheck,
    pub checked_at: String,
}

pub fn router(assistants: AssistantDirectory) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { assistants })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    assistants: AssistantDirectory,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(event_name = "system.health.start", bind_address = %address, "health endpoint started");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(assistants)).await {
            error!(
                event_name = "system.health.error",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let assistants = assistants_check(&state.assistants);
    let ready = assistants.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "bookly-server runtime initialized".to_string(),
        },
        assistants,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn assistants_check(directory: &AssistantDirectory) -> HealthCheck {
    let missing = directory.missing();
    if missing.is_empty() {
        HealthCheck {
            status: "ready",
            detail: format!("{} service assistants configured", directory.len()),
        }
    } else {
        let names: Vec<&str> = missing.iter().map(|category| category.label()).collect();
        HealthCheck {
            status: "degraded",
            detail: format!("missing assistant ids for: {}", names.join(", ")),
        }
    }
}
