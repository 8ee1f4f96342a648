//! Read-side operations on a user's fairytales.

use std::collections::HashMap;

use crate::common::{FairytaleId, PageRequest, UserId};
use crate::domains::fairytales::data::{
    FairytaleDetailResponse, FairytaleListResponse, FairytaleStatusResponse, FairytaleSummary,
};
use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::domains::fairytales::models::{Fairytale, FairytalePage};
use crate::kernel::ServerDeps;

async fn find_owned(
    fairytale_id: FairytaleId,
    user_id: UserId,
    deps: &ServerDeps,
) -> FairytaleResult<Fairytale> {
    deps.store
        .find_owned_fairytale(fairytale_id, user_id)
        .await?
        .ok_or(FairytaleError::FairytaleNotFound)
}

/// One page of the user's fairytales, newest first, with thumbnails.
pub async fn list_fairytales(
    user_id: UserId,
    page: PageRequest,
    deps: &ServerDeps,
) -> FairytaleResult<FairytaleListResponse> {
    let rows = deps.store.list_for_user(user_id, &page).await?;
    let (rows, has_next) = page.split(rows);

    let ids: Vec<FairytaleId> = rows.iter().map(|f| f.id).collect();
    let mut thumbnails: HashMap<FairytaleId, FairytalePage> = deps
        .store
        .find_thumbnails(&ids)
        .await?
        .into_iter()
        .map(|p| (p.fairytale_id, p))
        .collect();

    let summaries = rows
        .into_iter()
        .map(|f| {
            let thumbnail = thumbnails.remove(&f.id);
            FairytaleSummary::new(f, thumbnail)
        })
        .collect();

    Ok(FairytaleListResponse::new(summaries, has_next))
}

pub async fn get_fairytale_detail(
    fairytale_id: FairytaleId,
    user_id: UserId,
    deps: &ServerDeps,
) -> FairytaleResult<FairytaleDetailResponse> {
    let fairytale = find_owned(fairytale_id, user_id, deps).await?;
    let pages = deps.store.find_pages(fairytale_id).await?;
    Ok(FairytaleDetailResponse::new(fairytale, pages))
}

pub async fn get_fairytale_status(
    fairytale_id: FairytaleId,
    user_id: UserId,
    deps: &ServerDeps,
) -> FairytaleResult<FairytaleStatusResponse> {
    let fairytale = find_owned(fairytale_id, user_id, deps).await?;
    Ok(FairytaleStatusResponse::from(&fairytale))
}
