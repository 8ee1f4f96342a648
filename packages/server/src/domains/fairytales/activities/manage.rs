//! Owner-driven changes: rename and delete.

use tracing::{info, warn};

use crate::common::{FairytaleId, UserId};
use crate::domains::fairytales::data::{validate_name, RenameFairytaleResponse};
use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::kernel::ServerDeps;

pub async fn rename_fairytale(
    fairytale_id: FairytaleId,
    user_id: UserId,
    name: &str,
    deps: &ServerDeps,
) -> FairytaleResult<RenameFairytaleResponse> {
    validate_name(name)?;

    let mut fairytale = deps
        .store
        .find_owned_fairytale(fairytale_id, user_id)
        .await?
        .ok_or(FairytaleError::FairytaleNotFound)?;

    fairytale.rename(name.trim());
    let fairytale = deps.store.save_fairytale(&fairytale).await?;

    Ok(RenameFairytaleResponse {
        id: fairytale.id,
        name: fairytale.name,
        updated_at: fairytale.updated_at,
    })
}

/// Delete a fairytale, its pages and their stored images.
///
/// Refused while any post references the fairytale. Image deletes are
/// best effort: a failure is logged and the rest of the delete goes ahead.
pub async fn delete_fairytale(
    fairytale_id: FairytaleId,
    user_id: UserId,
    deps: &ServerDeps,
) -> FairytaleResult<()> {
    let fairytale = deps
        .store
        .find_owned_fairytale(fairytale_id, user_id)
        .await?
        .ok_or(FairytaleError::FairytaleNotFound)?;

    let posts = deps.store.count_posts(fairytale.id).await?;
    if posts > 0 {
        info!(fairytale_id = %fairytale.id, posts, "Refusing to delete fairytale with posts");
        return Err(FairytaleError::FairytaleHasPosts);
    }

    let pages = deps.store.find_pages(fairytale.id).await?;
    for page in &pages {
        if let Err(e) = deps.blobs.delete(&page.image_url).await {
            warn!(
                fairytale_id = %fairytale.id,
                page_index = page.page_index,
                image_url = %page.image_url,
                error = %e,
                "Failed to delete page image"
            );
        }
    }

    deps.store.delete_pages(fairytale.id).await?;
    deps.store.delete_fairytale(fairytale.id).await?;

    info!(fairytale_id = %fairytale.id, pages = pages.len(), "Fairytale deleted");
    Ok(())
}
