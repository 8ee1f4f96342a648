// TestDependencies - mock implementations for testing
//
// In-memory stand-ins for every Base* trait, with call recording and
// failure injection. Used by unit tests and the router tests in tests/.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    BaseBlobStorage, BaseFairytaleNotifier, BaseFairytaleStore, BaseGenerationClient,
    BasePushNotificationService, ServerDeps,
};
use crate::common::{FairytaleId, PageRequest, StoryId, UserId};
use crate::domains::fairytales::models::{Fairytale, FairytalePage, FairytaleStatus};
use crate::domains::stories::Story;

// =============================================================================
// In-memory Fairytale Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    stories: Vec<Story>,
    fairytales: Vec<Fairytale>,
    pages: Vec<FairytalePage>,
    post_counts: HashMap<FairytaleId, i64>,
}

#[derive(Default)]
pub struct InMemoryFairytaleStore {
    state: Mutex<StoreState>,
    fail_page_writes: AtomicBool,
    fail_deletes: AtomicBool,
    failing_saves: AtomicUsize,
}

impl InMemoryFairytaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an active story owned by `user_id` and return it.
    pub fn add_story(&self, user_id: UserId, text: &str) -> Story {
        let now = Utc::now();
        let story = Story {
            id: StoryId::new(),
            user_id,
            name: "A story".to_string(),
            text: text.to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().stories.push(story.clone());
        story
    }

    pub fn soft_delete_story(&self, story_id: StoryId) {
        let mut state = self.state.lock().unwrap();
        if let Some(story) = state.stories.iter_mut().find(|s| s.id == story_id) {
            story.is_deleted = true;
        }
    }

    /// Pretend `count` posts reference the fairytale.
    pub fn set_post_count(&self, id: FairytaleId, count: i64) {
        self.state.lock().unwrap().post_counts.insert(id, count);
    }

    /// Make page inserts (and completions) fail.
    pub fn fail_page_writes(&self, fail: bool) {
        self.fail_page_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` fairytale saves fail.
    pub fn fail_next_saves(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    /// Make page and fairytale deletes fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fairytales(&self) -> Vec<Fairytale> {
        self.state.lock().unwrap().fairytales.clone()
    }

    pub fn fairytale(&self, id: FairytaleId) -> Option<Fairytale> {
        self.state
            .lock()
            .unwrap()
            .fairytales
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }

    pub fn pages_of(&self, id: FairytaleId) -> Vec<FairytalePage> {
        let mut pages: Vec<FairytalePage> = self
            .state
            .lock()
            .unwrap()
            .pages
            .iter()
            .filter(|p| p.fairytale_id == id)
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.page_index);
        pages
    }

    /// Insert a fairytale directly, bypassing activities.
    pub fn put_fairytale(&self, fairytale: Fairytale) {
        self.state.lock().unwrap().fairytales.push(fairytale);
    }

    pub fn put_pages(&self, pages: Vec<FairytalePage>) {
        self.state.lock().unwrap().pages.extend(pages);
    }

    fn check_unique_pages(state: &StoreState, pages: &[FairytalePage]) -> Result<()> {
        for page in pages {
            let clash = state
                .pages
                .iter()
                .any(|p| p.fairytale_id == page.fairytale_id && p.page_index == page.page_index);
            if clash {
                anyhow::bail!("duplicate page_index {}", page.page_index);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BaseFairytaleStore for InMemoryFairytaleStore {
    async fn find_active_story(
        &self,
        story_id: StoryId,
        user_id: UserId,
    ) -> Result<Option<Story>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.id == story_id && s.user_id == user_id && !s.is_deleted)
            .cloned())
    }

    async fn find_by_story_and_status_in(
        &self,
        story_id: StoryId,
        statuses: &[FairytaleStatus],
    ) -> Result<Option<Fairytale>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .fairytales
            .iter()
            .filter(|f| f.story_id == story_id && statuses.contains(&f.status))
            .min_by_key(|f| f.id)
            .cloned())
    }

    async fn insert_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale> {
        let mut state = self.state.lock().unwrap();
        if state.fairytales.iter().any(|f| f.id == fairytale.id) {
            anyhow::bail!("duplicate fairytale id {}", fairytale.id);
        }
        state.fairytales.push(fairytale.clone());
        Ok(fairytale.clone())
    }

    async fn save_fairytale(&self, fairytale: &Fairytale) -> Result<Fairytale> {
        if self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("connection reset while saving fairytale");
        }
        let mut state = self.state.lock().unwrap();
        let row = state
            .fairytales
            .iter_mut()
            .find(|f| f.id == fairytale.id)
            .ok_or_else(|| anyhow::anyhow!("fairytale {} not found", fairytale.id))?;
        *row = fairytale.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn find_fairytale(&self, id: FairytaleId) -> Result<Option<Fairytale>> {
        Ok(self.fairytale(id))
    }

    async fn find_owned_fairytale(
        &self,
        id: FairytaleId,
        user_id: UserId,
    ) -> Result<Option<Fairytale>> {
        Ok(self.fairytale(id).filter(|f| f.user_id == user_id))
    }

    async fn list_for_user(&self, user_id: UserId, page: &PageRequest) -> Result<Vec<Fairytale>> {
        let mut rows: Vec<Fairytale> = self
            .state
            .lock()
            .unwrap()
            .fairytales
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter(|f| page.after.map_or(true, |after| f.id.into_uuid() < after))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(page.fetch_limit() as usize);
        Ok(rows)
    }

    async fn find_pages(&self, fairytale_id: FairytaleId) -> Result<Vec<FairytalePage>> {
        Ok(self.pages_of(fairytale_id))
    }

    async fn find_thumbnails(&self, ids: &[FairytaleId]) -> Result<Vec<FairytalePage>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pages
            .iter()
            .filter(|p| p.page_index == 0 && ids.contains(&p.fairytale_id))
            .cloned()
            .collect())
    }

    async fn insert_pages(&self, pages: &[FairytalePage]) -> Result<()> {
        if self.fail_page_writes.load(Ordering::SeqCst) {
            anyhow::bail!("page insert failed");
        }
        let mut state = self.state.lock().unwrap();
        Self::check_unique_pages(&state, pages)?;
        state.pages.extend(pages.iter().cloned());
        Ok(())
    }

    async fn delete_pages(&self, fairytale_id: FairytaleId) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("page delete failed");
        }
        self.state
            .lock()
            .unwrap()
            .pages
            .retain(|p| p.fairytale_id != fairytale_id);
        Ok(())
    }

    async fn complete_with_pages(
        &self,
        fairytale: &Fairytale,
        pages: &[FairytalePage],
    ) -> Result<Fairytale> {
        if self.fail_page_writes.load(Ordering::SeqCst) {
            // nothing applied, like a rolled back transaction
            anyhow::bail!("completion write failed");
        }

        let mut indexes: Vec<i32> = pages.iter().map(|p| p.page_index).collect();
        indexes.sort_unstable();
        indexes.dedup();
        if indexes.len() != pages.len() {
            anyhow::bail!("duplicate page_index in completion");
        }

        let mut state = self.state.lock().unwrap();
        let idx = state
            .fairytales
            .iter()
            .position(|f| f.id == fairytale.id)
            .ok_or_else(|| anyhow::anyhow!("fairytale {} not found", fairytale.id))?;

        state.pages.retain(|p| p.fairytale_id != fairytale.id);
        state.pages.extend(pages.iter().cloned());

        let mut saved = fairytale.clone();
        saved.updated_at = Utc::now();
        state.fairytales[idx] = saved.clone();
        Ok(saved)
    }

    async fn delete_fairytale(&self, id: FairytaleId) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("fairytale delete failed");
        }
        let mut state = self.state.lock().unwrap();
        state.fairytales.retain(|f| f.id != id);
        state.pages.retain(|p| p.fairytale_id != id);
        Ok(())
    }

    async fn count_posts(&self, id: FairytaleId) -> Result<i64> {
        Ok(*self.state.lock().unwrap().post_counts.get(&id).unwrap_or(&0))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Mock Generation Client
// =============================================================================

#[derive(Default)]
pub struct MockGenerationClient {
    calls: Arc<Mutex<Vec<(FairytaleId, String)>>>,
    fail: AtomicBool,
    unhealthy: AtomicBool,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A worker that rejects every submission.
    pub fn failing() -> Self {
        let client = Self::new();
        client.set_failing(true);
        client
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// Every submission attempt, including failed ones.
    pub fn calls(&self) -> Vec<(FairytaleId, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseGenerationClient for MockGenerationClient {
    async fn submit(&self, fairytale_id: FairytaleId, text: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((fairytale_id, text.to_string()));

        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("worker unreachable");
        }
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            anyhow::bail!("worker down");
        }
        Ok(())
    }
}

// =============================================================================
// Mock Blob Storage
// =============================================================================

pub const MOCK_BLOB_BASE_URL: &str = "https://blobs.test";

#[derive(Default)]
pub struct MockBlobStorage {
    upload_attempts: AtomicUsize,
    /// 1-based upload attempt that fails, if any
    fail_on_upload: Option<usize>,
    fail_deletes: AtomicBool,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
}

impl MockBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th upload (1-based); earlier ones succeed.
    pub fn failing_on_upload(n: usize) -> Self {
        Self {
            fail_on_upload: Some(n),
            ..Self::default()
        }
    }

    pub fn set_failing_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// URLs of successful uploads, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    /// Every delete call argument, in order (including failed ones).
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Uploaded and not successfully deleted since.
    pub fn live_objects(&self) -> Vec<String> {
        let removed = self.removed.lock().unwrap().clone();
        self.uploaded()
            .into_iter()
            .filter(|u| !removed.contains(u))
            .collect()
    }
}

#[async_trait]
impl BaseBlobStorage for MockBlobStorage {
    async fn upload(&self, bytes: Vec<u8>, _content_type: &str, file_name: &str) -> Result<String> {
        let attempt = self.upload_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_upload == Some(attempt) {
            anyhow::bail!("upload #{} failed", attempt);
        }
        if bytes.is_empty() {
            anyhow::bail!("empty upload");
        }

        let url = format!("{}/{}-{}", MOCK_BLOB_BASE_URL, attempt, file_name);
        self.uploaded.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, key_or_url: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(key_or_url.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("delete failed for {}", key_or_url);
        }
        self.removed.lock().unwrap().push(key_or_url.to_string());
        Ok(())
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(UserId, FairytaleId, String)>>,
    fail: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    /// Every notify attempt, including failed ones.
    pub fn sent(&self) -> Vec<(UserId, FairytaleId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseFairytaleNotifier for MockNotifier {
    async fn notify_completed(
        &self,
        user_id: UserId,
        fairytale_id: FairytaleId,
        fairytale_name: &str,
    ) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id, fairytale_id, fairytale_name.to_string()));

        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("push provider unavailable");
        }
        Ok(())
    }
}

// =============================================================================
// Mock Push Notification Service
// =============================================================================

#[derive(Default)]
pub struct MockPushNotificationService {
    sent_notifications: Mutex<Vec<(String, String, String, serde_json::Value)>>,
    failing_tokens: Vec<String>,
}

impl MockPushNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject sends to `token`.
    pub fn failing_for(mut self, token: &str) -> Self {
        self.failing_tokens.push(token.to_string());
        self
    }

    /// Successfully sent notifications (token, title, body, data)
    pub fn sent_notifications(&self) -> Vec<(String, String, String, serde_json::Value)> {
        self.sent_notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePushNotificationService for MockPushNotificationService {
    async fn send_notification(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()> {
        if self.failing_tokens.iter().any(|t| t == push_token) {
            anyhow::bail!("DeviceNotRegistered");
        }
        self.sent_notifications.lock().unwrap().push((
            push_token.to_string(),
            title.to_string(),
            body.to_string(),
            data,
        ));
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<InMemoryFairytaleStore>,
    pub generation: Arc<MockGenerationClient>,
    pub blobs: Arc<MockBlobStorage>,
    pub notifier: Arc<MockNotifier>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryFairytaleStore::new()),
            generation: Arc::new(MockGenerationClient::new()),
            blobs: Arc::new(MockBlobStorage::new()),
            notifier: Arc::new(MockNotifier::new()),
        }
    }

    pub fn mock_generation(mut self, client: MockGenerationClient) -> Self {
        self.generation = Arc::new(client);
        self
    }

    pub fn mock_blobs(mut self, blobs: MockBlobStorage) -> Self {
        self.blobs = Arc::new(blobs);
        self
    }

    pub fn mock_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// ServerDeps backed by these mocks (shared, so assertions see the calls).
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.generation.clone(),
            self.blobs.clone(),
            self.notifier.clone(),
        )
    }
}
