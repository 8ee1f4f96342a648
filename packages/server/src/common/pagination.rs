//! Keyset (cursor) pagination helpers.
//!
//! Lists are ordered by id descending. Ids are UUID v7, so that is newest
//! first, and the id of the last row on a page is all a caller needs to
//! resume. The cursor handed out is that id, base64-encoded so clients
//! treat it as opaque.
//!
//! ```rust,ignore
//! let page = PageRequest::new(query.after.as_deref(), query.limit)?;
//! let rows = Fairytale::find_by_user_paginated(user_id, &page, pool).await?;
//! let (rows, has_next) = page.split(rows);
//! ```

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 50;

/// Opaque cursor (base64-encoded UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(Uuid);

impl Cursor {
    pub fn new(id: Uuid) -> Self {
        Cursor(id)
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    pub fn decode(s: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .context("Invalid cursor: not valid base64")?;
        let uuid = Uuid::from_slice(&bytes).context("Invalid cursor: not a valid UUID")?;
        Ok(Cursor(uuid))
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Only rows with an id strictly below this one.
    pub after: Option<Uuid>,
    /// Page size, already clamped to `1..=MAX_LIMIT`.
    pub limit: i64,
}

impl PageRequest {
    /// Decode the cursor and clamp the limit. A missing limit means
    /// `DEFAULT_LIMIT`; out-of-range values are clamped, not rejected.
    pub fn new(after: Option<&str>, limit: Option<i64>) -> Result<Self> {
        let after = match after.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(Cursor::decode(raw)?.into_uuid()),
            None => None,
        };

        Ok(Self {
            after,
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }

    /// Rows to fetch: one extra to learn whether another page exists.
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }

    /// Trim the look-ahead row and report whether there was one.
    pub fn split<T>(&self, mut rows: Vec<T>) -> (Vec<T>, bool) {
        let has_next = rows.len() as i64 > self.limit;
        rows.truncate(self.limit as usize);
        (rows, has_next)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            after: None,
            limit: DEFAULT_LIMIT,
        }
    }
}
