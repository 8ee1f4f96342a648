use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a generation job.
///
/// `INIT -> PENDING -> PROCESSING -> {COMPLETED | FAILED | CANCELLED}`.
/// Nothing enforces the arrows: the worker's callbacks overwrite the status
/// unconditionally, so a late callback can move a finished job again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fairytale_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FairytaleStatus {
    Init,
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl FairytaleStatus {
    /// Statuses that block a new generation for the same story.
    pub const IN_FLIGHT: [FairytaleStatus; 3] = [
        FairytaleStatus::Init,
        FairytaleStatus::Pending,
        FairytaleStatus::Processing,
    ];

    pub fn is_in_flight(self) -> bool {
        Self::IN_FLIGHT.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_in_flight()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FairytaleStatus::Init => "INIT",
            FairytaleStatus::Pending => "PENDING",
            FairytaleStatus::Processing => "PROCESSING",
            FairytaleStatus::Completed => "COMPLETED",
            FairytaleStatus::Failed => "FAILED",
            FairytaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for FairytaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FairytaleStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INIT" => Ok(FairytaleStatus::Init),
            "PENDING" => Ok(FairytaleStatus::Pending),
            "PROCESSING" => Ok(FairytaleStatus::Processing),
            "COMPLETED" => Ok(FairytaleStatus::Completed),
            "FAILED" => Ok(FairytaleStatus::Failed),
            "CANCELLED" => Ok(FairytaleStatus::Cancelled),
            other => Err(anyhow::anyhow!("Unknown fairytale status: {}", other)),
        }
    }
}
