//! Test fixtures for rows this server only reads (stories, devices, posts).

use anyhow::Result;
use server_core::common::{FairytaleId, StoryId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

pub const STORY_TEXT: &str =
    "Once upon a time a small rabbit wanted to visit the moon more than anything else.";

pub async fn create_story(pool: &PgPool, user_id: UserId) -> Result<StoryId> {
    let id = StoryId::new();
    sqlx::query("INSERT INTO stories (id, user_id, name, text) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(user_id)
        .bind("Moon Rabbit")
        .bind(STORY_TEXT)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn soft_delete_story(pool: &PgPool, story_id: StoryId) -> Result<()> {
    sqlx::query("UPDATE stories SET is_deleted = true WHERE id = $1")
        .bind(story_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_device(pool: &PgPool, user_id: UserId, push_token: &str) -> Result<()> {
    sqlx::query("INSERT INTO devices (id, user_id, push_token) VALUES ($1, $2, $3)")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(push_token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_post(pool: &PgPool, user_id: UserId, fairytale_id: FairytaleId) -> Result<()> {
    sqlx::query("INSERT INTO posts (id, user_id, fairytale_id, title) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(fairytale_id)
        .bind("Look what we made")
        .execute(pool)
        .await?;
    Ok(())
}
