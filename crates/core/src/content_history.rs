//! Issue content history rules.
//!
//! A thread is the `(issue_id, comment_id)` pair that owns a chronological
//! sequence of revisions. `comment_id == 0` addresses the issue body itself.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Sub-thread id used for the issue body (as opposed to a comment).
pub const ISSUE_BODY_COMMENT_ID: DbId = 0;

/// Retention limit applied after each save unless configured otherwise.
pub const DEFAULT_KEEP_LIMIT: usize = 20;

/// Pruning always keeps the first and the last revision.
pub const MIN_KEEP_LIMIT: usize = 2;

/// Entity name used in not-found errors.
pub const ENTITY_NAME: &str = "issue_content_history";

/// Identifies one content thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ThreadKey {
    pub issue_id: DbId,
    pub comment_id: DbId,
}

impl ThreadKey {
    pub fn new(issue_id: DbId, comment_id: DbId) -> Self {
        Self {
            issue_id,
            comment_id,
        }
    }

    /// The thread holding the issue body.
    pub fn issue_body(issue_id: DbId) -> Self {
        Self::new(issue_id, ISSUE_BODY_COMMENT_ID)
    }

    pub fn is_issue_body(&self) -> bool {
        self.comment_id == ISSUE_BODY_COMMENT_ID
    }

    /// Reject non-positive issue ids and negative comment ids.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_id("issue_id", self.issue_id)?;
        if self.comment_id < 0 {
            return Err(CoreError::Validation(format!(
                "comment_id must be 0 or positive, got {}",
                self.comment_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "issue {} comment {}", self.issue_id, self.comment_id)
    }
}

/// Validate that an identifier is a positive integer.
pub fn validate_id(field: &str, id: DbId) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!(
            "{field} must be positive, got {id}"
        )));
    }
    Ok(())
}

/// Choose which revisions to hard-delete so that at most `keep_limit` remain.
///
/// `ordered_ids` must be the thread's revision ids in ascending
/// `(edited_unix, id)` order. The first and last entries are never selected.
/// Of the interior entries the oldest go first, so the survivors are the
/// first revision plus the `keep_limit - 1` most recent ones.
pub fn plan_retention(ordered_ids: &[DbId], keep_limit: usize) -> Vec<DbId> {
    let keep_limit = keep_limit.max(MIN_KEEP_LIMIT);
    if ordered_ids.len() <= keep_limit {
        return Vec::new();
    }
    let excess = ordered_ids.len() - keep_limit;
    // Interior is ordered_ids[1..len-1]; excess <= len - 2 so this stays inside it.
    ordered_ids[1..1 + excess].to_vec()
}
