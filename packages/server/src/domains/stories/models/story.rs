use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{StoryId, UserId};

/// User-authored source text a fairytale is generated from.
///
/// Owned by the stories feature; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Story {
    pub id: StoryId,
    pub user_id: UserId,
    pub name: String,
    pub text: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Story owned by `user_id` and not soft-deleted.
    pub async fn find_active_for_owner(
        id: StoryId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM stories WHERE id = $1 AND user_id = $2 AND is_deleted = false",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
