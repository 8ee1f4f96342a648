//! Ready-made COMPLETED fairytale for trying out the app without the worker.

use anyhow::anyhow;
use rust_embed::RustEmbed;
use tracing::{error, info, warn};

use crate::common::{StoryId, UserId};
use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::domains::fairytales::models::{Fairytale, FairytalePage, FairytaleStatus};
use crate::kernel::ServerDeps;

// Bundled page images, compiled into the binary
#[derive(RustEmbed)]
#[folder = "assets/sample-pages/"]
struct SamplePages;

pub const SAMPLE_NAME: &str = "Our Developer Cat Paw Story";
pub const SAMPLE_MESSAGE: &str = "Sample fairytale created.";

struct SamplePage {
    file_name: &'static str,
    mood: &'static str,
    story: &'static str,
}

const SAMPLE_PAGES: [SamplePage; 3] = [
    SamplePage {
        file_name: "page1-developers.png",
        mood: "Smile",
        story: "Once upon a time there were three developers.",
    },
    SamplePage {
        file_name: "page2-struggle.png",
        mood: "Sad",
        story: "They struggled very hard to graduate.",
    },
    SamplePage {
        file_name: "page3-graduation.png",
        mood: "Happy",
        story: "At last they graduated and lived happily ever after!",
    },
];

/// Create a COMPLETED fairytale with three bundled pages.
///
/// If an image upload fails, images already uploaded are deleted along with
/// the job and its pages, then `UploadFailed` is returned.
pub async fn generate_sample_fairytale(
    user_id: UserId,
    deps: &ServerDeps,
) -> FairytaleResult<Fairytale> {
    // Not tied to a real story
    let mut fairytale = Fairytale::new(user_id, StoryId::new(), SAMPLE_NAME);
    fairytale.set_page_number(SAMPLE_PAGES.len() as i32);
    fairytale.set_status(FairytaleStatus::Completed, SAMPLE_MESSAGE);
    let fairytale = deps.store.insert_fairytale(&fairytale).await?;

    let mut uploaded: Vec<String> = Vec::with_capacity(SAMPLE_PAGES.len());
    for page in &SAMPLE_PAGES {
        match upload_sample_image(page.file_name, deps).await {
            Ok(url) => {
                info!(fairytale_id = %fairytale.id, file = page.file_name, url = %url, "Uploaded sample image");
                uploaded.push(url);
            }
            Err(e) => {
                error!(
                    fairytale_id = %fairytale.id,
                    file = page.file_name,
                    error = %e,
                    "Sample image upload failed"
                );
                roll_back(&fairytale, &uploaded, deps).await;
                return Err(FairytaleError::UploadFailed);
            }
        }
    }

    let pages: Vec<FairytalePage> = SAMPLE_PAGES
        .iter()
        .zip(&uploaded)
        .enumerate()
        .map(|(i, (page, url))| {
            FairytalePage::new(fairytale.id, i as i32, page.mood, page.story, url.as_str())
        })
        .collect();

    if let Err(e) = deps.store.insert_pages(&pages).await {
        roll_back(&fairytale, &uploaded, deps).await;
        return Err(e.into());
    }

    info!(fairytale_id = %fairytale.id, user_id = %user_id, "Sample fairytale created");
    Ok(fairytale)
}

async fn upload_sample_image(file_name: &str, deps: &ServerDeps) -> anyhow::Result<String> {
    let file = SamplePages::get(file_name)
        .ok_or_else(|| anyhow!("sample image {} is not bundled", file_name))?;
    let content_type = mime_guess::from_path(file_name).first_or_octet_stream();

    deps.blobs
        .upload(file.data.into_owned(), content_type.as_ref(), file_name)
        .await
}

/// Undo a partial sample creation. Every step runs even if an earlier one
/// failed.
async fn roll_back(fairytale: &Fairytale, uploaded: &[String], deps: &ServerDeps) {
    for url in uploaded {
        if let Err(e) = deps.blobs.delete(url).await {
            warn!(fairytale_id = %fairytale.id, url = %url, error = %e, "Cleanup: image delete failed");
        }
    }

    if let Err(e) = deps.store.delete_pages(fairytale.id).await {
        warn!(fairytale_id = %fairytale.id, error = %e, "Cleanup: page delete failed");
    }

    if let Err(e) = deps.store.delete_fairytale(fairytale.id).await {
        warn!(fairytale_id = %fairytale.id, error = %e, "Cleanup: fairytale delete failed");
    }

    info!(
        fairytale_id = %fairytale.id,
        images = uploaded.len(),
        "Rolled back sample fairytale"
    );
}
