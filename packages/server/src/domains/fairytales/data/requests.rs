use serde::Deserialize;

use crate::domains::fairytales::errors::{FairytaleError, FairytaleResult};
use crate::domains::fairytales::models::FairytaleStatus;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MAX_CHARS: usize = 255;
pub const MOOD_MAX_CHARS: usize = 50;
pub const STORY_MAX_CHARS: usize = 2000;
pub const IMAGE_URL_MAX_CHARS: usize = 1000;

fn invalid(msg: impl Into<String>) -> FairytaleError {
    FairytaleError::Validation(msg.into())
}

fn require_not_blank(field: &str, value: &str) -> FairytaleResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{} is required", field)));
    }
    Ok(())
}

fn require_max_chars(field: &str, value: &str, max: usize) -> FairytaleResult<()> {
    if value.chars().count() > max {
        return Err(invalid(format!("{} must be at most {} characters", field, max)));
    }
    Ok(())
}

/// Fairytale names are 2 to 100 characters.
pub fn validate_name(name: &str) -> FairytaleResult<()> {
    let len = name.trim().chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(invalid(format!(
            "name must be between {} and {} characters",
            NAME_MIN_CHARS, NAME_MAX_CHARS
        )));
    }
    Ok(())
}

pub fn validate_message(message: &str) -> FairytaleResult<()> {
    require_max_chars("message", message, MESSAGE_MAX_CHARS)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFairytaleRequest {
    pub story_id: String,
    pub name: String,
}

impl GenerateFairytaleRequest {
    pub fn validate(&self) -> FairytaleResult<()> {
        require_not_blank("storyId", &self.story_id)?;
        validate_name(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFairytaleRequest {
    pub name: String,
}

impl RenameFairytaleRequest {
    pub fn validate(&self) -> FairytaleResult<()> {
        validate_name(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFairytaleStatusRequest {
    pub status: FairytaleStatus,
    #[serde(default)]
    pub message: String,
}

impl UpdateFairytaleStatusRequest {
    pub fn validate(&self) -> FairytaleResult<()> {
        validate_message(&self.message)
    }
}

/// One page as reported by the worker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub page_index: i32,
    pub mood: String,
    pub story: String,
    pub image_url: String,
}

impl PageContent {
    pub fn validate(&self) -> FairytaleResult<()> {
        if self.page_index < 0 {
            return Err(invalid("pageIndex must be 0 or greater"));
        }
        require_not_blank("mood", &self.mood)?;
        require_max_chars("mood", &self.mood, MOOD_MAX_CHARS)?;
        require_not_blank("story", &self.story)?;
        require_max_chars("story", &self.story, STORY_MAX_CHARS)?;
        require_not_blank("imageUrl", &self.image_url)?;
        require_max_chars("imageUrl", &self.image_url, IMAGE_URL_MAX_CHARS)
    }
}

/// Everything the worker reports when a run finishes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub page_number: i32,
    pub page_list: Vec<PageContent>,
    pub status: FairytaleStatus,
    pub message: String,
}

impl CompletionReport {
    pub fn validate(&self) -> FairytaleResult<()> {
        if self.page_number < 1 {
            return Err(invalid("pageNumber must be 1 or greater"));
        }
        require_not_blank("message", &self.message)?;
        validate_message(&self.message)?;

        let mut seen = std::collections::HashSet::new();
        for page in &self.page_list {
            page.validate()?;
            if !seen.insert(page.page_index) {
                return Err(invalid(format!("duplicate pageIndex {}", page.page_index)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyFairytaleCompletionRequest {
    pub id: String,
    #[serde(flatten)]
    pub report: CompletionReport,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFairytalesQuery {
    pub after: Option<String>,
    pub limit: Option<i64>,
}
