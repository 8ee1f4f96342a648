use serde::{Deserialize, Serialize};

/// Body of a generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    #[serde(rename = "fairytaleId")]
    pub fairytale_id: String,
    pub text: String,
}

/// Envelope returned by the worker on 2xx.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerApiResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// How the worker took a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// 409 Conflict: the worker already has this fairytale queued.
    AlreadyRequested,
}
