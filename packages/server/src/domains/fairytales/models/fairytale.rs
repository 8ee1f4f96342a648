use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use super::FairytaleStatus;
use crate::common::{FairytaleId, PageRequest, StoryId, UserId};

/// A fairytale generation job and, once finished, the fairytale itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fairytale {
    pub id: FairytaleId,
    pub user_id: UserId,
    pub story_id: StoryId,
    pub name: String,
    /// Declared page count (set on completion)
    pub page_number: i32,
    pub status: FairytaleStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fairytale {
    /// New job in `INIT`, not yet persisted.
    pub fn new(user_id: UserId, story_id: StoryId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: FairytaleId::new(),
            user_id,
            story_id,
            name: name.into(),
            page_number: 0,
            status: FairytaleStatus::Init,
            message: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite status and message. No transition check: last write wins.
    pub fn set_status(&mut self, status: FairytaleStatus, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
    }

    pub fn set_page_number(&mut self, page_number: i32) {
        self.page_number = page_number;
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn find_by_id(id: FairytaleId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM fairytales WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id_and_user(
        id: FairytaleId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM fairytales WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Oldest job for the story whose status is in `statuses`.
    pub async fn find_by_story_and_status_in(
        story_id: StoryId,
        statuses: &[FairytaleStatus],
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();

        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM fairytales
            WHERE story_id = $1 AND status::text = ANY($2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(story_id)
        .bind(statuses)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Newest first, keyset on id. Fetches one row past the page.
    pub async fn find_by_user_paginated(
        user_id: UserId,
        page: &PageRequest,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM fairytales
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(page.after)
        .bind(page.fetch_limit())
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Number of posts that reference this fairytale.
    pub async fn count_posts(id: FairytaleId, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE fairytale_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO fairytales
                (id, user_id, story_id, name, page_number, status, message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.story_id)
        .bind(&self.name)
        .bind(self.page_number)
        .bind(self.status)
        .bind(&self.message)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Persist name, page count, status and message.
    pub async fn update(&self, pool: &PgPool) -> Result<Self> {
        let mut conn = pool.acquire().await?;
        self.update_on(&mut conn).await
    }

    /// Same as [`Fairytale::update`], on a caller-supplied connection or
    /// transaction.
    pub async fn update_on(&self, conn: &mut PgConnection) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE fairytales
            SET name = $2, page_number = $3, status = $4, message = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.page_number)
        .bind(self.status)
        .bind(&self.message)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    /// Delete the job. Pages cascade.
    pub async fn delete(id: FairytaleId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM fairytales WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
