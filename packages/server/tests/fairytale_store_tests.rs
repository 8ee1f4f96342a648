//! Postgres integration tests for the fairytale store and models.
//!
//! Run against a shared testcontainers Postgres; every test uses fresh ids.

mod common;

use std::sync::Arc;

use common::{create_device, create_post, create_story, soft_delete_story, TestHarness};
use server_core::common::{FairytaleId, PageRequest, StoryId, UserId};
use server_core::domains::fairytales::activities;
use server_core::domains::fairytales::{Fairytale, FairytalePage, FairytaleStatus};
use server_core::domains::notifications::PushNotifier;
use server_core::kernel::test_dependencies::{
    MockBlobStorage, MockGenerationClient, MockNotifier, MockPushNotificationService,
};
use server_core::kernel::{BaseFairytaleNotifier, BaseFairytaleStore, ServerDeps};
use test_context::test_context;

fn pages(id: FairytaleId, count: i32, mood: &str) -> Vec<FairytalePage> {
    (0..count)
        .map(|i| {
            FairytalePage::new(id, i, mood, format!("page {}", i), format!("https://cdn.test/{}.png", i))
        })
        .collect()
}

fn deps_for(ctx: &TestHarness, generation: MockGenerationClient) -> ServerDeps {
    ServerDeps::new(
        Arc::new(ctx.store()),
        Arc::new(generation),
        Arc::new(MockBlobStorage::new()),
        Arc::new(MockNotifier::new()),
    )
}

#[test_context(TestHarness)]
#[tokio::test]
async fn insert_and_update_round_trip(ctx: &TestHarness) {
    let store = ctx.store();
    let job = Fairytale::new(UserId::new(), StoryId::new(), "Moon Rabbit");

    let mut saved = store.insert_fairytale(&job).await.unwrap();
    assert_eq!(saved.status, FairytaleStatus::Init);
    assert_eq!(saved.message, "");
    assert_eq!(saved.page_number, 0);

    saved.set_status(FairytaleStatus::Processing, "working");
    let updated = store.save_fairytale(&saved).await.unwrap();
    assert_eq!(updated.status, FairytaleStatus::Processing);

    let found = store.find_fairytale(job.id).await.unwrap().unwrap();
    assert_eq!(found.message, "working");

    let other_user = store
        .find_owned_fairytale(job.id, UserId::new())
        .await
        .unwrap();
    assert!(other_user.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn in_flight_lookup_ignores_finished_jobs(ctx: &TestHarness) {
    let store = ctx.store();
    let user = UserId::new();
    let story = StoryId::new();

    let mut failed = Fairytale::new(user, story, "Failed run");
    failed.set_status(FairytaleStatus::Failed, "nope");
    store.insert_fairytale(&failed).await.unwrap();

    let found = store
        .find_by_story_and_status_in(story, &FairytaleStatus::IN_FLIGHT)
        .await
        .unwrap();
    assert!(found.is_none());

    let mut pending = Fairytale::new(user, story, "Queued run");
    pending.set_status(FairytaleStatus::Pending, "");
    store.insert_fairytale(&pending).await.unwrap();

    let found = store
        .find_by_story_and_status_in(story, &FairytaleStatus::IN_FLIGHT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, pending.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn story_lookup_checks_owner_and_soft_delete(ctx: &TestHarness) {
    let store = ctx.store();
    let owner = UserId::new();
    let story_id = create_story(&ctx.db_pool, owner).await.unwrap();

    let story = store.find_active_story(story_id, owner).await.unwrap().unwrap();
    assert_eq!(story.text, common::STORY_TEXT);

    assert!(store
        .find_active_story(story_id, UserId::new())
        .await
        .unwrap()
        .is_none());

    soft_delete_story(&ctx.db_pool, story_id).await.unwrap();
    assert!(store.find_active_story(story_id, owner).await.unwrap().is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn completion_replaces_pages_in_one_transaction(ctx: &TestHarness) {
    let store = ctx.store();
    let mut job = store
        .insert_fairytale(&Fairytale::new(UserId::new(), StoryId::new(), "Moon Rabbit"))
        .await
        .unwrap();
    store.insert_pages(&pages(job.id, 5, "Old")).await.unwrap();

    job.set_status(FairytaleStatus::Completed, "done");
    job.set_page_number(3);
    store
        .complete_with_pages(&job, &pages(job.id, 3, "New"))
        .await
        .unwrap();

    let stored = store.find_pages(job.id).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|p| p.mood == "New"));
    assert_eq!(
        store.find_fairytale(job.id).await.unwrap().unwrap().status,
        FairytaleStatus::Completed
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_completion_rolls_back_status_and_pages(ctx: &TestHarness) {
    let store = ctx.store();
    let mut job = Fairytale::new(UserId::new(), StoryId::new(), "Moon Rabbit");
    job.set_status(FairytaleStatus::Processing, "working");
    let mut job = store.insert_fairytale(&job).await.unwrap();
    store.insert_pages(&pages(job.id, 2, "Old")).await.unwrap();

    // duplicate page_index violates the unique constraint
    let mut bad = pages(job.id, 2, "New");
    bad[1].page_index = 0;
    job.set_status(FairytaleStatus::Completed, "done");

    assert!(store.complete_with_pages(&job, &bad).await.is_err());

    let stored = store.find_pages(job.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|p| p.mood == "Old"));
    assert_eq!(
        store.find_fairytale(job.id).await.unwrap().unwrap().status,
        FairytaleStatus::Processing
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn user_listing_pages_newest_first_with_thumbnails(ctx: &TestHarness) {
    let store = ctx.store();
    let user = UserId::new();

    let mut ids = Vec::new();
    for i in 0..3 {
        let job = store
            .insert_fairytale(&Fairytale::new(user, StoryId::new(), format!("Tale {}", i)))
            .await
            .unwrap();
        ids.push(job.id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    store.insert_pages(&pages(ids[2], 2, "Happy")).await.unwrap();

    let page = PageRequest::new(None, Some(2)).unwrap();
    let rows = store.list_for_user(user, &page).await.unwrap();
    let (rows, has_next) = page.split(rows);
    assert!(has_next);
    assert_eq!(rows.iter().map(|f| f.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

    let page = PageRequest {
        after: Some(ids[1].into_uuid()),
        limit: 2,
    };
    let rows = store.list_for_user(user, &page).await.unwrap();
    assert_eq!(rows.iter().map(|f| f.id).collect::<Vec<_>>(), vec![ids[0]]);

    let thumbs = store.find_thumbnails(&ids).await.unwrap();
    assert_eq!(thumbs.len(), 1);
    assert_eq!(thumbs[0].fairytale_id, ids[2]);
    assert_eq!(thumbs[0].page_index, 0);
    assert_eq!(thumbs[0].mood, "Happy");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_cascades_and_posts_are_counted(ctx: &TestHarness) {
    let store = ctx.store();
    let user = UserId::new();
    let job = store
        .insert_fairytale(&Fairytale::new(user, StoryId::new(), "Moon Rabbit"))
        .await
        .unwrap();
    store.insert_pages(&pages(job.id, 2, "Happy")).await.unwrap();

    assert_eq!(store.count_posts(job.id).await.unwrap(), 0);

    let shared = store
        .insert_fairytale(&Fairytale::new(user, StoryId::new(), "Shared"))
        .await
        .unwrap();
    create_post(&ctx.db_pool, user, shared.id).await.unwrap();
    assert_eq!(store.count_posts(shared.id).await.unwrap(), 1);

    store.delete_fairytale(job.id).await.unwrap();
    assert!(store.find_fairytale(job.id).await.unwrap().is_none());
    assert!(store.find_pages(job.id).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn start_generation_against_postgres(ctx: &TestHarness) {
    let user = UserId::new();
    let story_id = create_story(&ctx.db_pool, user).await.unwrap();
    let deps = deps_for(ctx, MockGenerationClient::new());

    let first = activities::start_generation(user, story_id, "Moon Rabbit", &deps)
        .await
        .unwrap();
    let second = activities::start_generation(user, story_id, "Moon Rabbit", &deps)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.status, FairytaleStatus::Processing);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fairytales WHERE story_id = $1")
        .bind(story_id)
        .fetch_one(&ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn worker_failure_keeps_failed_row(ctx: &TestHarness) {
    let user = UserId::new();
    let story_id = create_story(&ctx.db_pool, user).await.unwrap();
    let deps = deps_for(ctx, MockGenerationClient::failing());

    assert!(activities::start_generation(user, story_id, "Moon Rabbit", &deps)
        .await
        .is_err());

    let status: String =
        sqlx::query_scalar("SELECT status::text FROM fairytales WHERE story_id = $1")
            .bind(story_id)
            .fetch_one(&ctx.db_pool)
            .await
            .unwrap();
    assert_eq!(status, "FAILED");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn push_notifier_reaches_every_device(ctx: &TestHarness) {
    let user = UserId::new();
    create_device(&ctx.db_pool, user, "ExponentPushToken[good]").await.unwrap();
    create_device(&ctx.db_pool, user, "ExponentPushToken[bad]").await.unwrap();

    let push = Arc::new(MockPushNotificationService::new().failing_for("ExponentPushToken[bad]"));
    let notifier = PushNotifier::new(ctx.db_pool.clone(), push.clone());
    let fairytale_id = FairytaleId::new();

    notifier
        .notify_completed(user, fairytale_id, "Moon Rabbit")
        .await
        .unwrap();

    // the bad token fails, the good one still gets its push
    let sent = push.sent_notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "ExponentPushToken[good]");
    assert!(sent[0].2.contains("Moon Rabbit"));
    assert_eq!(sent[0].3["targetId"], fairytale_id.to_string());

    // nobody registered: nothing sent, still Ok
    notifier
        .notify_completed(UserId::new(), fairytale_id, "Moon Rabbit")
        .await
        .unwrap();
    assert_eq!(push.sent_notifications().len(), 1);
}
