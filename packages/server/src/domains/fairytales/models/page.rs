use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::common::{FairytaleId, FairytalePageId};

/// One illustrated page of a fairytale. Page 0 is the thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FairytalePage {
    pub id: FairytalePageId,
    pub fairytale_id: FairytaleId,
    pub page_index: i32,
    pub mood: String,
    pub story: String,
    pub image_url: String,
}

impl FairytalePage {
    pub fn new(
        fairytale_id: FairytaleId,
        page_index: i32,
        mood: impl Into<String>,
        story: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: FairytalePageId::new(),
            fairytale_id,
            page_index,
            mood: mood.into(),
            story: story.into(),
            image_url: image_url.into(),
        }
    }

    pub async fn find_by_fairytale(fairytale_id: FairytaleId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM fairytale_pages WHERE fairytale_id = $1 ORDER BY page_index",
        )
        .bind(fairytale_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Page 0 for each of `fairytale_ids` (list thumbnails).
    pub async fn find_first_pages(
        fairytale_ids: &[FairytaleId],
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        if fairytale_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Self>(
            "SELECT * FROM fairytale_pages WHERE fairytale_id = ANY($1) AND page_index = 0",
        )
        .bind(fairytale_ids)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Bulk insert in one statement.
    pub async fn insert_all(pages: &[Self], conn: &mut PgConnection) -> Result<()> {
        if pages.is_empty() {
            return Ok(());
        }

        let ids: Vec<FairytalePageId> = pages.iter().map(|p| p.id).collect();
        let fairytale_ids: Vec<FairytaleId> = pages.iter().map(|p| p.fairytale_id).collect();
        let indexes: Vec<i32> = pages.iter().map(|p| p.page_index).collect();
        let moods: Vec<&str> = pages.iter().map(|p| p.mood.as_str()).collect();
        let stories: Vec<&str> = pages.iter().map(|p| p.story.as_str()).collect();
        let urls: Vec<&str> = pages.iter().map(|p| p.image_url.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO fairytale_pages (id, fairytale_id, page_index, mood, story, image_url)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::int4[], $4::text[], $5::text[], $6::text[])
            "#,
        )
        .bind(ids)
        .bind(fairytale_ids)
        .bind(indexes)
        .bind(moods)
        .bind(stories)
        .bind(urls)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn delete_by_fairytale(
        fairytale_id: FairytaleId,
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM fairytale_pages WHERE fairytale_id = $1")
            .bind(fairytale_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Drop every page of the job and insert `pages` in their place.
    /// Callers pass a transaction so the swap is atomic.
    pub async fn replace_all(
        fairytale_id: FairytaleId,
        pages: &[Self],
        conn: &mut PgConnection,
    ) -> Result<()> {
        Self::delete_by_fairytale(fairytale_id, conn).await?;
        Self::insert_all(pages, conn).await
    }
}
