//! Issue content history model (one snapshot per edit).

use quarry_core::content_history::ThreadKey;
use quarry_core::diff::{DiffLine, DiffStats};
use quarry_core::types::{DbId, Timestamp, UnixTimestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `issue_content_histories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentHistory {
    pub id: DbId,
    pub issue_id: DbId,
    pub comment_id: DbId,
    pub poster_id: DbId,
    pub content_text: String,
    pub edited_unix: UnixTimestamp,
    pub is_first_created: bool,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentHistory {
    pub fn thread(&self) -> ThreadKey {
        ThreadKey::new(self.issue_id, self.comment_id)
    }
}

/// DTO for saving a new revision.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentHistory {
    pub issue_id: DbId,
    pub comment_id: DbId,
    pub poster_id: DbId,
    pub edited_unix: UnixTimestamp,
    pub content_text: String,
    pub is_first_created: bool,
}

impl CreateContentHistory {
    pub fn thread(&self) -> ThreadKey {
        ThreadKey::new(self.issue_id, self.comment_id)
    }
}

/// A revision compared against the visible revision before it.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionDiff {
    pub revision: ContentHistory,
    pub previous: Option<ContentHistory>,
    pub lines: Vec<DiffLine>,
    pub stats: DiffStats,
}
