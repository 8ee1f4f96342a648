//! Callbacks from the generation worker: progress updates and completion.

use tracing::{info, warn};

use crate::common::FairytaleId;
use crate::domains::fairytales::data::{validate_message, CompletionReport};
use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::domains::fairytales::models::{Fairytale, FairytalePage, FairytaleStatus};
use crate::kernel::ServerDeps;

/// Overwrite status and message. Pages are untouched.
pub async fn update_status(
    fairytale_id: FairytaleId,
    status: FairytaleStatus,
    message: &str,
    deps: &ServerDeps,
) -> FairytaleResult<Fairytale> {
    validate_message(message)?;

    let mut fairytale = deps
        .store
        .find_fairytale(fairytale_id)
        .await?
        .ok_or_else(|| {
            warn!(fairytale_id = %fairytale_id, "Status update for unknown fairytale");
            FairytaleError::FairytaleNotFound
        })?;

    let previous = fairytale.status;
    fairytale.set_status(status, message);
    let fairytale = deps.store.save_fairytale(&fairytale).await?;

    info!(
        fairytale_id = %fairytale_id,
        from = %previous,
        to = %status,
        "Fairytale status updated"
    );
    Ok(fairytale)
}

/// Record the worker's final result.
///
/// The job's pages are replaced wholesale with `report.page_list` in the
/// same transaction as the status write. The owner's push notification is
/// sent afterwards; if it fails the completion still stands.
pub async fn complete_generation(
    fairytale_id: FairytaleId,
    report: CompletionReport,
    deps: &ServerDeps,
) -> FairytaleResult<Fairytale> {
    report.validate()?;

    let mut fairytale = deps
        .store
        .find_fairytale(fairytale_id)
        .await?
        .ok_or_else(|| {
            warn!(fairytale_id = %fairytale_id, "Completion for unknown fairytale");
            FairytaleError::FairytaleNotFound
        })?;

    fairytale.set_status(report.status, report.message);
    fairytale.set_page_number(report.page_number);

    let pages: Vec<FairytalePage> = report
        .page_list
        .into_iter()
        .map(|p| FairytalePage::new(fairytale_id, p.page_index, p.mood, p.story, p.image_url))
        .collect();

    let fairytale = deps.store.complete_with_pages(&fairytale, &pages).await?;

    info!(
        fairytale_id = %fairytale_id,
        status = %fairytale.status,
        pages = pages.len(),
        "Fairytale completion recorded"
    );

    if let Err(e) = deps
        .notifier
        .notify_completed(fairytale.user_id, fairytale.id, &fairytale.name)
        .await
    {
        warn!(
            fairytale_id = %fairytale_id,
            user_id = %fairytale.user_id,
            error = %e,
            "Failed to send completion notification"
        );
    }

    Ok(fairytale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{StoryId, UserId};
    use crate::domains::fairytales::data::PageContent;
    use crate::kernel::test_dependencies::MockNotifier;
    use crate::kernel::TestDependencies;

    fn processing_job(test: &TestDependencies) -> Fairytale {
        let mut job = Fairytale::new(UserId::new(), StoryId::new(), "Moon Rabbit");
        job.set_status(FairytaleStatus::Processing, "working");
        test.store.put_fairytale(job.clone());
        job
    }

    fn report(page_count: i32) -> CompletionReport {
        CompletionReport {
            page_number: page_count,
            page_list: (0..page_count)
                .map(|i| PageContent {
                    page_index: i,
                    mood: "Happy".into(),
                    story: format!("page {}", i),
                    image_url: format!("https://cdn.test/{}.png", i),
                })
                .collect(),
            status: FairytaleStatus::Completed,
            message: "Fairytale generated.".into(),
        }
    }

    #[tokio::test]
    async fn status_update_overwrites_and_keeps_pages() {
        let test = TestDependencies::new();
        let job = processing_job(&test);
        test.store
            .put_pages(vec![FairytalePage::new(job.id, 0, "Sad", "s", "u")]);

        let updated = update_status(job.id, FairytaleStatus::Cancelled, "stopped", &test.server_deps())
            .await
            .unwrap();

        assert_eq!(updated.status, FairytaleStatus::Cancelled);
        assert_eq!(updated.message, "stopped");
        assert_eq!(test.store.pages_of(job.id).len(), 1);
    }

    #[tokio::test]
    async fn status_update_on_terminal_job_is_accepted() {
        let test = TestDependencies::new();
        let mut job = Fairytale::new(UserId::new(), StoryId::new(), "Moon Rabbit");
        job.set_status(FairytaleStatus::Completed, "done");
        test.store.put_fairytale(job.clone());

        let updated = update_status(job.id, FairytaleStatus::Processing, "again", &test.server_deps())
            .await
            .unwrap();

        assert_eq!(updated.status, FairytaleStatus::Processing);
    }

    #[tokio::test]
    async fn status_update_for_unknown_job() {
        let test = TestDependencies::new();
        let err = update_status(FairytaleId::new(), FairytaleStatus::Failed, "", &test.server_deps())
            .await
            .unwrap_err();
        assert!(matches!(err, FairytaleError::FairytaleNotFound));
    }

    #[tokio::test]
    async fn completion_replaces_existing_pages() {
        let test = TestDependencies::new();
        let job = processing_job(&test);
        test.store.put_pages(
            (0..5)
                .map(|i| FairytalePage::new(job.id, i, "Old", "old", "https://cdn.test/old.png"))
                .collect(),
        );

        let done = complete_generation(job.id, report(3), &test.server_deps())
            .await
            .unwrap();

        assert_eq!(done.status, FairytaleStatus::Completed);
        assert_eq!(done.page_number, 3);
        let pages = test.store.pages_of(job.id);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.mood == "Happy"));
        assert_eq!(
            pages.iter().map(|p| p.page_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn completion_notifies_the_owner() {
        let test = TestDependencies::new();
        let job = processing_job(&test);

        complete_generation(job.id, report(1), &test.server_deps())
            .await
            .unwrap();

        assert_eq!(
            test.notifier.sent(),
            vec![(job.user_id, job.id, "Moon Rabbit".to_string())]
        );
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_completion() {
        let test = TestDependencies::new().mock_notifier(MockNotifier::failing());
        let job = processing_job(&test);

        let done = complete_generation(job.id, report(2), &test.server_deps())
            .await
            .unwrap();

        assert_eq!(done.status, FairytaleStatus::Completed);
        assert_eq!(test.store.fairytale(job.id).unwrap().status, FairytaleStatus::Completed);
        assert_eq!(test.store.pages_of(job.id).len(), 2);
        assert_eq!(test.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_write_changes_nothing_and_skips_notification() {
        let test = TestDependencies::new();
        let job = processing_job(&test);
        test.store
            .put_pages(vec![FairytalePage::new(job.id, 0, "Old", "old", "u")]);
        test.store.fail_page_writes(true);

        let err = complete_generation(job.id, report(2), &test.server_deps())
            .await
            .unwrap_err();

        assert!(matches!(err, FairytaleError::Internal(_)));
        assert_eq!(test.store.fairytale(job.id).unwrap().status, FairytaleStatus::Processing);
        assert_eq!(test.store.pages_of(job.id).len(), 1);
        assert!(test.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn completion_for_unknown_job() {
        let test = TestDependencies::new();
        let err = complete_generation(FairytaleId::new(), report(1), &test.server_deps())
            .await
            .unwrap_err();
        assert!(matches!(err, FairytaleError::FairytaleNotFound));
        assert!(test.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_report_is_rejected() {
        let test = TestDependencies::new();
        let job = processing_job(&test);
        let mut bad = report(2);
        bad.page_list[1].page_index = 0;

        let err = complete_generation(job.id, bad, &test.server_deps())
            .await
            .unwrap_err();

        assert!(matches!(err, FairytaleError::Validation(_)));
        assert_eq!(test.store.fairytale(job.id).unwrap().status, FairytaleStatus::Processing);
    }
}
