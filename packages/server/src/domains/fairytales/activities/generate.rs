//! Start a fairytale generation for one of the user's stories.

use anyhow::Result;
use tracing::{error, info};

use crate::common::{StoryId, UserId};
use crate::domains::fairytales::data::validate_name;
use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::domains::fairytales::models::{Fairytale, FairytaleStatus};
use crate::kernel::ServerDeps;

pub const IN_PROGRESS_MESSAGE: &str = "Fairytale generation in progress.";
pub const FAILED_MESSAGE: &str = "Fairytale generation failed. Please try again later.";

/// Create a generation job for `story_id` and hand it to the worker.
///
/// If the story already has a job in flight, that job is returned and
/// nothing is created or submitted. Once the job row exists, any failure
/// while moving it to `PROCESSING` or submitting it leaves the job `FAILED`
/// and returns `CannotReachGenerationService`, so a retry is never blocked
/// by a job nobody will advance.
///
/// The in-flight check and the insert are not atomic: two concurrent calls
/// for the same story can both create a job.
pub async fn start_generation(
    user_id: UserId,
    story_id: StoryId,
    name: &str,
    deps: &ServerDeps,
) -> FairytaleResult<Fairytale> {
    validate_name(name)?;

    let story = deps
        .store
        .find_active_story(story_id, user_id)
        .await?
        .ok_or(FairytaleError::StoryNotFound)?;

    if let Some(existing) = deps
        .store
        .find_by_story_and_status_in(story_id, &FairytaleStatus::IN_FLIGHT)
        .await?
    {
        info!(
            fairytale_id = %existing.id,
            story_id = %story_id,
            status = %existing.status,
            "Generation already in flight, returning existing job"
        );
        return Ok(existing);
    }

    let fairytale = Fairytale::new(user_id, story_id, name.trim());
    let fairytale = deps.store.insert_fairytale(&fairytale).await?;

    match submit(fairytale.clone(), &story.text, deps).await {
        Ok(fairytale) => Ok(fairytale),
        Err(e) => {
            error!(fairytale_id = %fairytale.id, error = %e, "Fairytale generation did not start");
            mark_failed(fairytale, deps).await;
            Err(FairytaleError::CannotReachGenerationService)
        }
    }
}

async fn submit(mut fairytale: Fairytale, text: &str, deps: &ServerDeps) -> Result<Fairytale> {
    fairytale.set_status(FairytaleStatus::Processing, IN_PROGRESS_MESSAGE);
    let fairytale = deps.store.save_fairytale(&fairytale).await?;

    info!(
        fairytale_id = %fairytale.id,
        story_id = %fairytale.story_id,
        user_id = %fairytale.user_id,
        "Submitting fairytale generation"
    );
    deps.generation.submit(fairytale.id, text).await?;

    Ok(fairytale)
}

async fn mark_failed(mut fairytale: Fairytale, deps: &ServerDeps) {
    fairytale.set_status(FairytaleStatus::Failed, FAILED_MESSAGE);
    if let Err(e) = deps.store.save_fairytale(&fairytale).await {
        error!(fairytale_id = %fairytale.id, error = %e, "Failed to mark fairytale as failed");
    }
}
