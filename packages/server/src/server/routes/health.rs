use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::server::app::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: ComponentHealth,
    worker: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

async fn probe<F>(check: F) -> ComponentHealth
where
    F: Future<Output = anyhow::Result<()>>,
{
    match tokio::time::timeout(PROBE_TIMEOUT, check).await {
        Ok(Ok(())) => ComponentHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => ComponentHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
        Err(_) => ComponentHealth {
            status: "error".to_string(),
            error: Some(format!("Timed out after {}s", PROBE_TIMEOUT.as_secs())),
        },
    }
}

/// Health check endpoint
///
/// Checks:
/// - Database connectivity
/// - Generation worker reachability (reported, does not affect the status code)
///
/// Returns 200 OK if the database is healthy, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (database, worker) = tokio::join!(
        probe(state.deps.store.ping()),
        probe(state.deps.generation.health()),
    );

    let (status, status_code) = if database.is_ok() {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            database,
            worker,
        }),
    )
}
