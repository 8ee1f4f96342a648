//! Postgres-backed `BaseFairytaleStore`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Fairytale, FairytalePage, FairytaleStatus};
use crate::common::{FairytaleId, PageRequest, StoryId, UserId};
use crate::domains::stories::Story;
use crate::kernel::BaseFairytaleStore;

#[derive(Clone)]
pub struct PgFairytaleStore {
    pool: PgPool,
}

impl PgFairytaleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseFairytaleStore for PgFairytaleStore {
    async fn find_active_story(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> Result<Option<Story>> {
        Story::find_active_for_owner(story_id, user_id, &self.pool).await
    }

    async fn find_by_story_and_status_in(
        &self,
        story_id: StoryId,
        statuses: &[FairytaleStatus],
    ) -> Result<Option<Fairytale>> {
        Fairytale::find_by_story_and_status_in(story_id, statuses, &self.pool).await
    }

    async fn insert_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale> {
        fairytale.insert(&self.pool).await
    }

    async fn save_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale> {
        fairytale.update(&self.pool).await
    }

    async fn find_fairytale(&self, id: FairytaleId) -> Result<Option<Fairytale>> {
        Fairytale::find_by_id(id, &self.pool).await
    }

    async fn find_owned_fairytale(
        &self,
        id: FairytaleId,
        user_id: UserId,
    ) -> Result<Option<Fairytale>> {
        Fairytale::find_by_id_and_user(id, user_id, &self.pool).await
    }

    async fn list_for_user(&self, user_id: UserId, page: &PageRequest) -> Result<Vec<Fairytale>> {
        Fairytale::find_by_user_paginated(user_id, page, &self.pool).await
    }

    async fn find_pages(&self, fairytale_id: FairytaleId) -> Result<Vec<FairytalePage>> {
        FairytalePage::find_by_fairytale(fairytale_id, &self.pool).await
    }

    async fn find_thumbnails(&self, ids: &[FairytaleId]) -> Result<Vec<FairytalePage>> {
        FairytalePage::find_first_pages(ids, &self.pool).await
    }

    async fn insert_pages(&self, pages: &[FairytalePage]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        FairytalePage::insert_all(pages, &mut conn).await
    }

    async fn delete_pages(&self, fairytale_id: FairytaleId) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        FairytalePage::delete_by_fairytale(fairytale_id, &mut conn).await?;
        Ok(())
    }

    async fn complete_with_pages(
        &self,
        fairytale: &Fairytale,
        pages: &[FairytalePage],
    ) -> Result<Fairytale> {
        let mut tx = self.pool.begin().await?;

        let saved = fairytale.update_on(&mut tx).await?;
        FairytalePage::replace_all(fairytale.id, pages, &mut tx).await?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_fairytale(&self, id: FairytaleId) -> Result<()> {
        Fairytale::delete(id, &self.pool).await
    }

    async fn count_posts(&self, id: FairytaleId) -> Result<i64> {
        Fairytale::count_posts(id, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
