//! Request-level flows over [`ContentHistoryRepo`].
//!
//! The service validates identifiers, maps missing rows to
//! [`CoreError::NotFound`], and runs retention after every save. Retention is
//! maintenance: its failures are logged and never undo the save.

use std::collections::HashMap;

use quarry_core::content_history::{validate_id, ThreadKey, ENTITY_NAME};
use quarry_core::diff::{diff_lines, diff_stats};
use quarry_core::error::CoreError;
use quarry_core::pagination::{clamp_limit, page_offset, Page};
use quarry_core::types::{DbId, UnixTimestamp};
use sqlx::{Connection, PgConnection};

use crate::config::ContentHistoryConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::content_history::{ContentHistory, CreateContentHistory, RevisionDiff};
use crate::repositories::ContentHistoryRepo;

/// The content a thread had before its first recorded edit.
#[derive(Debug, Clone)]
pub struct OriginalContent {
    pub poster_id: DbId,
    pub created_unix: UnixTimestamp,
    pub content_text: String,
}

/// One edit of an issue body or comment.
#[derive(Debug, Clone)]
pub struct ContentEdit {
    pub thread: ThreadKey,
    pub editor_id: DbId,
    pub edited_unix: UnixTimestamp,
    pub content_text: String,
    /// Saved as the first revision when the thread has no history yet.
    pub original: OriginalContent,
}

#[derive(Debug, Clone, Default)]
pub struct ContentHistoryService {
    config: ContentHistoryConfig,
}

impl ContentHistoryService {
    pub fn new(config: ContentHistoryConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// Save a revision, then prune its thread to the configured limit.
    ///
    /// Pruning runs in a savepoint when `conn` is inside a transaction. If it
    /// fails only the savepoint is rolled back and the saved revision is
    /// still returned.
    pub async fn save(
        &self,
        conn: &mut PgConnection,
        input: &CreateContentHistory,
    ) -> StoreResult<ContentHistory> {
        input.thread().validate()?;
        validate_id("poster_id", input.poster_id)?;

        let history = ContentHistoryRepo::create(conn, input)
            .await
            .map_err(StoreError::from_sqlx)?;

        tracing::info!(
            history_id = history.id,
            issue_id = history.issue_id,
            comment_id = history.comment_id,
            is_first_created = history.is_first_created,
            "Content history saved"
        );

        self.prune_best_effort(conn, history.thread()).await;
        Ok(history)
    }

    /// Record an edit of a thread in one transaction.
    ///
    /// When the thread has no history yet, its original content is saved
    /// first with `is_first_created = true`. A concurrent first edit that
    /// already wrote the original is detected by the storage layer and the
    /// duplicate is skipped.
    pub async fn record_edit(
        &self,
        conn: &mut PgConnection,
        edit: &ContentEdit,
    ) -> StoreResult<ContentHistory> {
        edit.thread.validate()?;
        validate_id("editor_id", edit.editor_id)?;
        validate_id("poster_id", edit.original.poster_id)?;

        let mut tx = conn.begin().await?;

        if !ContentHistoryRepo::exists_for_thread(&mut *tx, edit.thread).await? {
            let original = CreateContentHistory {
                issue_id: edit.thread.issue_id,
                comment_id: edit.thread.comment_id,
                poster_id: edit.original.poster_id,
                edited_unix: edit.original.created_unix,
                content_text: edit.original.content_text.clone(),
                is_first_created: true,
            };
            match ContentHistoryRepo::create_first_if_absent(&mut *tx, &original).await? {
                Some(first) => tracing::debug!(
                    history_id = first.id,
                    thread = %edit.thread,
                    "Original content saved as first revision"
                ),
                None => tracing::debug!(
                    thread = %edit.thread,
                    "First revision written concurrently, skipping"
                ),
            }
        }

        let revision = CreateContentHistory {
            issue_id: edit.thread.issue_id,
            comment_id: edit.thread.comment_id,
            poster_id: edit.editor_id,
            edited_unix: edit.edited_unix,
            content_text: edit.content_text.clone(),
            is_first_created: false,
        };
        let history = self.save(&mut *tx, &revision).await?;

        tx.commit().await?;
        Ok(history)
    }

    /// Fetch a revision by ID, soft-deleted or not.
    pub async fn get(&self, conn: &mut PgConnection, id: DbId) -> StoreResult<ContentHistory> {
        validate_id("id", id)?;
        ContentHistoryRepo::find_by_id(conn, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a revision and the visible revision before it in its thread.
    pub async fn get_with_previous(
        &self,
        conn: &mut PgConnection,
        id: DbId,
    ) -> StoreResult<(ContentHistory, Option<ContentHistory>)> {
        let history = self.get(conn, id).await?;
        let previous = ContentHistoryRepo::find_previous(conn, &history).await?;
        Ok((history, previous))
    }

    /// Diff a revision against the visible revision before it.
    ///
    /// The first visible revision is diffed against empty content.
    pub async fn diff_with_previous(
        &self,
        conn: &mut PgConnection,
        id: DbId,
    ) -> StoreResult<RevisionDiff> {
        let (revision, previous) = self.get_with_previous(conn, id).await?;
        let older = previous.as_ref().map_or("", |p| p.content_text.as_str());
        let lines = diff_lines(older, &revision.content_text);
        let stats = diff_stats(&lines);
        Ok(RevisionDiff {
            revision,
            previous,
            lines,
            stats,
        })
    }

    /// Visible revision counts per comment of an issue (`0` is the issue body).
    pub async fn edited_count_map(
        &self,
        conn: &mut PgConnection,
        issue_id: DbId,
    ) -> StoreResult<HashMap<DbId, i64>> {
        validate_id("issue_id", issue_id)?;
        Ok(ContentHistoryRepo::edited_count_map(conn, issue_id).await?)
    }

    /// One page of visible revisions, newest first.
    ///
    /// `page` is 1-based. `page_size` falls back to the configured default and
    /// is capped at the configured maximum.
    pub async fn list(
        &self,
        conn: &mut PgConnection,
        thread: ThreadKey,
        page: i64,
        page_size: Option<i64>,
    ) -> StoreResult<Page<ContentHistory>> {
        thread.validate()?;
        let page = page.max(1);
        let page_size = clamp_limit(
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        );

        let total = ContentHistoryRepo::count_by_thread(conn, thread).await?;
        let items = ContentHistoryRepo::list_by_thread(
            conn,
            thread,
            page_size,
            page_offset(page, page_size),
        )
        .await?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Every visible revision of a thread, newest first.
    pub async fn list_all(
        &self,
        conn: &mut PgConnection,
        thread: ThreadKey,
    ) -> StoreResult<Vec<ContentHistory>> {
        thread.validate()?;
        Ok(ContentHistoryRepo::list_all_by_thread(conn, thread).await?)
    }

    /// Whether the thread has any stored revision, soft-deleted ones included.
    pub async fn exists(&self, conn: &mut PgConnection, thread: ThreadKey) -> StoreResult<bool> {
        thread.validate()?;
        Ok(ContentHistoryRepo::exists_for_thread(conn, thread).await?)
    }

    /// Hide a revision from listings. Idempotent.
    pub async fn soft_delete(&self, conn: &mut PgConnection, id: DbId) -> StoreResult<()> {
        validate_id("id", id)?;
        if !ContentHistoryRepo::soft_delete(conn, id).await? {
            return Err(not_found(id));
        }
        tracing::info!(history_id = id, "Content history soft-deleted");
        Ok(())
    }

    async fn prune_best_effort(&self, conn: &mut PgConnection, thread: ThreadKey) {
        match ContentHistoryRepo::keep_limited(conn, thread, self.config.keep_limit).await {
            Ok(0) => tracing::debug!(%thread, "Content history within retention limit"),
            Ok(deleted) => tracing::info!(
                issue_id = thread.issue_id,
                comment_id = thread.comment_id,
                deleted,
                keep_limit = self.config.keep_limit,
                "Pruned content history"
            ),
            Err(e) => tracing::warn!(
                issue_id = thread.issue_id,
                comment_id = thread.comment_id,
                error = %e,
                "Content history pruning failed"
            ),
        }
    }
}

fn not_found(id: DbId) -> StoreError {
    StoreError::Core(CoreError::NotFound {
        entity: ENTITY_NAME,
        id,
    })
}
