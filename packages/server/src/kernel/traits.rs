// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Fairytale workflows live in domains/fairytales/activities and use these.
//
// Naming convention: Base* for trait names (e.g., BaseBlobStorage)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{FairytaleId, PageRequest, StoryId, UserId};
use crate::domains::fairytales::models::{Fairytale, FairytalePage, FairytaleStatus};
use crate::domains::stories::Story;

// =============================================================================
// Generation worker (external AI service)
// =============================================================================

#[async_trait]
pub trait BaseGenerationClient: Send + Sync {
    /// Ask the worker to start generating `fairytale_id` from `text`.
    ///
    /// "Already requested" counts as success. Any error means the worker
    /// did not take the job.
    async fn submit(&self, fairytale_id: FairytaleId, text: &str) -> Result<()>;

    /// Cheap liveness probe for the health endpoint.
    async fn health(&self) -> Result<()>;
}

// =============================================================================
// Persistence
// =============================================================================

#[async_trait]
pub trait BaseFairytaleStore: Send + Sync {
    /// Story owned by `user_id` that has not been soft-deleted.
    async fn find_active_story(&self, story_id: StoryId, user_id: UserId)
        -> Result<Option<Story>>;

    /// Any fairytale for the story whose status is one of `statuses`.
    async fn find_by_story_and_status_in(
        &self,
        story_id: StoryId,
        statuses: &[FairytaleStatus],
    ) -> Result<Option<Fairytale>>;

    async fn insert_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale>;

    /// Persist mutable fields; `updated_at` is refreshed.
    async fn save_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale>;

    async fn find_fairytale(&self, id: FairytaleId) -> Result<Option<Fairytale>>;

    async fn find_owned_fairytale(
        &self,
        id: FairytaleId,
        user_id: UserId,
    ) -> Result<Option<Fairytale>>;

    /// Newest first; returns up to `page.fetch_limit()` rows.
    async fn list_for_user(&self, user_id: UserId, page: &PageRequest) -> Result<Vec<Fairytale>>;

    /// Pages ordered by index.
    async fn find_pages(&self, fairytale_id: FairytaleId) -> Result<Vec<FairytalePage>>;

    /// Page 0 of each given fairytale, where one exists.
    async fn find_thumbnails(&self, ids: &[FairytaleId]) -> Result<Vec<FairytalePage>>;

    async fn insert_pages(&self, pages: &[FairytalePage]) -> Result<()>;

    async fn delete_pages(&self, fairytale_id: FairytaleId) -> Result<()>;

    /// Save the fairytale and replace all of its pages atomically.
    async fn complete_with_pages(
        &self,
        fairytale: &Fairytale,
        pages: &[FairytalePage],
    ) -> Result<Fairytale>;

    /// Delete the fairytale row (pages go with it).
    async fn delete_fairytale(&self, id: FairytaleId) -> Result<()>;

    /// Number of posts that reference the fairytale.
    async fn count_posts(&self, id: FairytaleId) -> Result<i64>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

// =============================================================================
// Blob storage (page images)
// =============================================================================

#[async_trait]
pub trait BaseBlobStorage: Send + Sync {
    /// Store bytes and return the public URL.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> Result<String>;

    /// Delete by object key or by a public URL this storage handed out.
    async fn delete(&self, key_or_url: &str) -> Result<()>;
}

// =============================================================================
// Push Notification Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BasePushNotificationService: Send + Sync {
    /// Send a push notification to a push token
    async fn send_notification(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()>;
}

/// "Your fairytale is ready" delivery to a user, whatever the channel.
#[async_trait]
pub trait BaseFairytaleNotifier: Send + Sync {
    async fn notify_completed(
        &self,
        user_id: UserId,
        fairytale_id: FairytaleId,
        fairytale_name: &str,
    ) -> Result<()>;
}
