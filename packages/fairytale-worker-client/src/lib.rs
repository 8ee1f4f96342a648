//! REST client for the fairytale generation worker.
//!
//! The worker is the long-running AI service that turns story text into
//! illustrated pages. This client only triggers a run; results come back
//! later through the server's callback endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use fairytale_worker_client::{WorkerClient, WorkerOptions};
//!
//! let client = WorkerClient::new(WorkerOptions {
//!     base_url: "http://worker:8000".into(),
//!     generate_endpoint: "/fairytale/generate".into(),
//!     service_token: "secret".into(),
//!     timeout: std::time::Duration::from_secs(10),
//! })?;
//!
//! client.request_generation("0190f2a4-...", "Once upon a time...").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, WorkerError, WorkerFailureReason};
pub use types::{GenerationRequest, SubmitOutcome, WorkerApiResponse};

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub base_url: String,
    pub generate_endpoint: String,
    /// Bearer token the worker expects from us.
    pub service_token: String,
    pub timeout: Duration,
}

pub struct WorkerClient {
    client: reqwest::Client,
    options: WorkerOptions,
}

impl WorkerClient {
    pub fn new(options: WorkerOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| WorkerError::Config(e.to_string()))?;

        Ok(Self { client, options })
    }

    fn base_url(&self) -> &str {
        self.options.base_url.trim_end_matches('/')
    }

    pub fn generate_url(&self) -> String {
        format!("{}{}", self.base_url(), self.options.generate_endpoint)
    }

    /// Ask the worker to generate a fairytale from `text`.
    ///
    /// A 409 from the worker means the run is already queued and counts as
    /// success. Everything else outside "2xx with `success: true`" is an error.
    pub async fn request_generation(&self, fairytale_id: &str, text: &str) -> Result<SubmitOutcome> {
        let url = self.generate_url();
        let body = GenerationRequest {
            fairytale_id: fairytale_id.to_string(),
            text: text.to_string(),
        };

        info!(fairytale_id, url = %url, "Sending fairytale generation request to worker");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.options.service_token)
            .json(&body)
            .send()
            .await
            .map_err(WorkerError::from_transport)?;

        let status = resp.status();
        if status == StatusCode::CONFLICT {
            warn!(fairytale_id, "Duplicate generation request, worker already has it");
            return Ok(SubmitOutcome::AlreadyRequested);
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            let err = WorkerError::from_status(status.as_u16(), message);
            error!(
                fairytale_id,
                status = status.as_u16(),
                reason = ?err.reason(),
                error = %err,
                "Worker refused generation request"
            );
            return Err(err);
        }

        let api_resp: WorkerApiResponse = resp
            .json()
            .await
            .map_err(|e| WorkerError::InvalidResponse(e.to_string()))?;

        if !api_resp.success {
            error!(fairytale_id, response = ?api_resp, "Worker returned success=false");
            let detail = api_resp
                .error
                .or(api_resp.message)
                .unwrap_or_else(|| "success=false".to_string());
            return Err(WorkerError::Rejected(detail));
        }

        info!(fairytale_id, "Fairytale generation request accepted");
        Ok(SubmitOutcome::Accepted)
    }

    /// Probe the worker's `/health` endpoint.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url());
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(WorkerError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WorkerError::from_status(status.as_u16(), message));
        }
        Ok(())
    }
}
