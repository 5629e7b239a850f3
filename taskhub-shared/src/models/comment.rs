/// Comment model and database operations (Comment Store)
///
/// Comments hang off tasks by a non-owning reference and carry their own
/// soft-delete flag: soft-deleting a task neither removes nor hides the
/// comments already attached to it.
///
/// Mutations are author-scoped. A caller who is not the author gets the same
/// `NotFound` as for a comment that does not exist. The store never reveals
/// whether the record was missing or merely not theirs.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id),
///     user_id UUID NOT NULL REFERENCES users(id),
///     content TEXT NOT NULL,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::task::Task;

/// Comment record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author of the comment
    pub user_id: Uuid,

    /// Comment body
    pub content: String,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last updated
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Adds a comment to the non-deleted task with the given title
    ///
    /// # Errors
    ///
    /// - `StoreError::Validation` when the content is empty
    /// - `StoreError::NotFound` when no non-deleted task has that title
    pub async fn add(
        pool: &PgPool,
        task_title: &str,
        author_id: Uuid,
        content: &str,
    ) -> StoreResult<Self> {
        if content.trim().is_empty() {
            return Err(StoreError::validation("content", "content is required"));
        }

        let task = Task::find_active_by_title(pool, task_title)
            .await?
            .ok_or_else(|| StoreError::not_found("task"))?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, content, is_deleted, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists the non-deleted comments of the task with the given title,
    /// most recent first
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no non-deleted task has that
    /// title.
    pub async fn list_for_task(pool: &PgPool, task_title: &str) -> StoreResult<Vec<Self>> {
        let task = Task::find_active_by_title(pool, task_title)
            .await?
            .ok_or_else(|| StoreError::not_found("task"))?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, user_id, content, is_deleted, created_at, updated_at
            FROM comments
            WHERE task_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(task.id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Replaces the content of the caller's own comment
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when the comment is missing, deleted,
    /// or authored by someone else; the three cases are indistinguishable
    /// to the caller.
    pub async fn update(
        pool: &PgPool,
        comment_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> StoreResult<Self> {
        if content.trim().is_empty() {
            return Err(StoreError::validation("content", "content is required"));
        }

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            RETURNING id, task_id, user_id, content, is_deleted, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(author_id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        comment.ok_or_else(|| StoreError::not_found("comment"))
    }

    /// Soft-deletes the caller's own comment
    ///
    /// Same ownership predicate as [`Comment::update`]; a second identical
    /// call fails `NotFound` because the predicate no longer matches.
    pub async fn soft_delete(
        pool: &PgPool,
        comment_id: Uuid,
        author_id: Uuid,
    ) -> StoreResult<Self> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            RETURNING id, task_id, user_id, content, is_deleted, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

        comment.ok_or_else(|| StoreError::not_found("comment"))
    }
}
