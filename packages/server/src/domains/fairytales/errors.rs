use thiserror::Error;

/// Failures a fairytale operation reports to its caller.
///
/// Best-effort side effects (push delivery, blob cleanup) never surface here.
#[derive(Debug, Error)]
pub enum FairytaleError {
    #[error("Story not found")]
    StoryNotFound,

    #[error("Fairytale not found")]
    FairytaleNotFound,

    #[error("{0}")]
    Validation(String),

    /// The worker did not accept the job; the job was left FAILED.
    #[error("Cannot reach the fairytale generation service")]
    CannotReachGenerationService,

    #[error("Fairytale has posts and cannot be deleted")]
    FairytaleHasPosts,

    /// Sample image upload failed; everything created so far was removed.
    #[error("Failed to upload fairytale images")]
    UploadFailed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type FairytaleResult<T> = std::result::Result<T, FairytaleError>;
