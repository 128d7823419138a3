//! Repository for the `issue_content_histories` table.
//!
//! Revisions are append-only snapshots. The only in-place change is the
//! soft-delete flag; rows are physically removed only by [`ContentHistoryRepo::keep_limited`].

use std::collections::HashMap;

use quarry_core::content_history::{plan_retention, ThreadKey};
use quarry_core::types::DbId;
use sqlx::{Connection, PgConnection};

use crate::models::content_history::{ContentHistory, CreateContentHistory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, issue_id, comment_id, poster_id, content_text, edited_unix, \
    is_first_created, is_deleted, created_at, updated_at";

/// Provides save, query, soft-delete, and retention operations for content history.
pub struct ContentHistoryRepo;

impl ContentHistoryRepo {
    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a new revision.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateContentHistory,
    ) -> Result<ContentHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO issue_content_histories
                (issue_id, comment_id, poster_id, content_text, edited_unix, is_first_created)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(input.issue_id)
            .bind(input.comment_id)
            .bind(input.poster_id)
            .bind(&input.content_text)
            .bind(input.edited_unix)
            .bind(input.is_first_created)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert the original revision of a thread unless one already exists.
    ///
    /// The partial unique index `uq_issue_content_histories_first` arbitrates
    /// concurrent first edits. Returns `None` when another first revision won.
    pub async fn create_first_if_absent(
        conn: &mut PgConnection,
        input: &CreateContentHistory,
    ) -> Result<Option<ContentHistory>, sqlx::Error> {
        let query = format!(
            "INSERT INTO issue_content_histories
                (issue_id, comment_id, poster_id, content_text, edited_unix, is_first_created)
             VALUES ($1, $2, $3, $4, $5, true)
             ON CONFLICT (issue_id, comment_id) WHERE is_first_created DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(input.issue_id)
            .bind(input.comment_id)
            .bind(input.poster_id)
            .bind(&input.content_text)
            .bind(input.edited_unix)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Set the soft-delete flag. Returns `true` if the row exists.
    ///
    /// Calling this on an already deleted row is a no-op that still returns `true`.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE issue_content_histories SET
                is_deleted = true,
                updated_at = CASE WHEN is_deleted THEN updated_at ELSE NOW() END
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete the oldest interior revisions of a thread so that at most
    /// `keep_limit` remain. The first and last revisions always survive.
    ///
    /// Counts every physical row, soft-deleted or not. The boundary rows are
    /// computed from a locked snapshot inside a transaction (a savepoint when
    /// `conn` is already in one). Returns the number of deleted rows.
    pub async fn keep_limited(
        conn: &mut PgConnection,
        thread: ThreadKey,
        keep_limit: usize,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = conn.begin().await?;

        let ordered_ids: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2
             ORDER BY edited_unix ASC, id ASC
             FOR UPDATE",
        )
        .bind(thread.issue_id)
        .bind(thread.comment_id)
        .fetch_all(&mut *tx)
        .await?;

        let doomed = plan_retention(&ordered_ids, keep_limit);
        if doomed.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM issue_content_histories WHERE id = ANY($1)")
            .bind(&doomed[..])
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Find a revision by ID. Soft-deleted rows are included.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ContentHistory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issue_content_histories WHERE id = $1");
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find the visible revision immediately before `history` in its thread,
    /// ordered by `(edited_unix, id)`.
    pub async fn find_previous(
        conn: &mut PgConnection,
        history: &ContentHistory,
    ) -> Result<Option<ContentHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2 AND is_deleted = false
               AND (edited_unix, id) < ($3, $4)
             ORDER BY edited_unix DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(history.issue_id)
            .bind(history.comment_id)
            .bind(history.edited_unix)
            .bind(history.id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Count visible revisions per comment of an issue.
    ///
    /// The issue body is reported under comment id `0`. Threads with no
    /// visible revisions are absent from the map.
    pub async fn edited_count_map(
        conn: &mut PgConnection,
        issue_id: DbId,
    ) -> Result<HashMap<DbId, i64>, sqlx::Error> {
        let rows: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT comment_id, COUNT(*)::BIGINT
             FROM issue_content_histories
             WHERE issue_id = $1 AND is_deleted = false
             GROUP BY comment_id",
        )
        .bind(issue_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().collect())
    }

    /// List visible revisions of a thread, newest first, with limit/offset.
    pub async fn list_by_thread(
        conn: &mut PgConnection,
        thread: ThreadKey,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ContentHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2 AND is_deleted = false
             ORDER BY edited_unix DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(thread.issue_id)
            .bind(thread.comment_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// List every visible revision of a thread, newest first.
    pub async fn list_all_by_thread(
        conn: &mut PgConnection,
        thread: ThreadKey,
    ) -> Result<Vec<ContentHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2 AND is_deleted = false
             ORDER BY edited_unix DESC, id DESC"
        );
        sqlx::query_as::<_, ContentHistory>(&query)
            .bind(thread.issue_id)
            .bind(thread.comment_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Count visible revisions of a thread (for pagination metadata).
    pub async fn count_by_thread(
        conn: &mut PgConnection,
        thread: ThreadKey,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2 AND is_deleted = false",
        )
        .bind(thread.issue_id)
        .bind(thread.comment_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Whether the thread has any stored revision, soft-deleted ones included.
    pub async fn exists_for_thread(
        conn: &mut PgConnection,
        thread: ThreadKey,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM issue_content_histories
                WHERE issue_id = $1 AND comment_id = $2
             )",
        )
        .bind(thread.issue_id)
        .bind(thread.comment_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Count all stored revisions of a thread, soft-deleted ones included.
    pub async fn count_physical_by_thread(
        conn: &mut PgConnection,
        thread: ThreadKey,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM issue_content_histories
             WHERE issue_id = $1 AND comment_id = $2",
        )
        .bind(thread.issue_id)
        .bind(thread.comment_id)
        .fetch_one(&mut *conn)
        .await
    }
}
