use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{Cursor, FairytaleId};
use crate::domains::fairytales::models::{Fairytale, FairytalePage, FairytaleStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFairytaleResponse {
    pub fairytale_id: FairytaleId,
    pub status: FairytaleStatus,
    pub message: String,
}

impl From<&Fairytale> for GenerateFairytaleResponse {
    fn from(f: &Fairytale) -> Self {
        Self {
            fairytale_id: f.id,
            status: f.status,
            message: f.message.clone(),
        }
    }
}

/// Returned to the worker after a status or completion callback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFairytaleStatusResponse {
    pub id: FairytaleId,
    pub status: FairytaleStatus,
    pub message: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&Fairytale> for UpdateFairytaleStatusResponse {
    fn from(f: &Fairytale) -> Self {
        Self {
            id: f.id,
            status: f.status,
            message: f.message.clone(),
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairytaleStatusResponse {
    pub status: FairytaleStatus,
    pub message: String,
}

impl From<&Fairytale> for FairytaleStatusResponse {
    fn from(f: &Fairytale) -> Self {
        Self {
            status: f.status,
            message: f.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub page_index: i32,
    pub mood: String,
    pub story: String,
    pub image_url: String,
}

impl From<FairytalePage> for PageResponse {
    fn from(p: FairytalePage) -> Self {
        Self {
            page_index: p.page_index,
            mood: p.mood,
            story: p.story,
            image_url: p.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairytaleDetailResponse {
    pub id: FairytaleId,
    pub name: String,
    pub page_number: i32,
    pub page_list: Vec<PageResponse>,
    pub status: FairytaleStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FairytaleDetailResponse {
    pub fn new(f: Fairytale, pages: Vec<FairytalePage>) -> Self {
        Self {
            id: f.id,
            name: f.name,
            page_number: f.page_number,
            page_list: pages.into_iter().map(PageResponse::from).collect(),
            status: f.status,
            message: f.message,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairytaleSummary {
    pub id: FairytaleId,
    pub name: String,
    pub page_number: i32,
    /// Page 0, if the fairytale has pages yet
    pub thumbnail: Option<PageResponse>,
    pub status: FairytaleStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FairytaleSummary {
    pub fn new(f: Fairytale, thumbnail: Option<FairytalePage>) -> Self {
        Self {
            id: f.id,
            name: f.name,
            page_number: f.page_number,
            thumbnail: thumbnail.map(PageResponse::from),
            status: f.status,
            message: f.message,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairytaleListResponse {
    pub fairytales: Vec<FairytaleSummary>,
    pub has_next: bool,
    pub next_cursor: Option<String>,
}

impl FairytaleListResponse {
    pub fn new(fairytales: Vec<FairytaleSummary>, has_next: bool) -> Self {
        let next_cursor = if has_next {
            fairytales
                .last()
                .map(|f| Cursor::new(f.id.into_uuid()).encode())
        } else {
            None
        };
        Self {
            fairytales,
            has_next,
            next_cursor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFairytaleResponse {
    pub id: FairytaleId,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteFairytaleResponse {
    pub success: bool,
}
