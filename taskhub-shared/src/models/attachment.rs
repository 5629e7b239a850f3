/// Attachment model and database operations (Attachment Store)
///
/// Attachments are metadata records over blobs held by the blob store (see
/// `crate::storage`): the row carries the original filename, the opaque
/// locator the store returned, the mime type and the size. Soft deletes hide
/// the row; the blob itself is never touched.
///
/// The store intentionally does not verify that `task_id` references a live
/// task; uploads against unknown or deleted tasks are accepted as designed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE attachments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     filename VARCHAR(255) NOT NULL,
///     blob_locator VARCHAR(512) NOT NULL,
///     mime_type VARCHAR(255) NOT NULL,
///     size_bytes BIGINT NOT NULL,
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

/// Attachment metadata record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    /// Unique attachment ID
    pub id: Uuid,

    /// Task the attachment belongs to (not validated against the task store)
    pub task_id: Uuid,

    /// User who uploaded the file
    pub user_id: Uuid,

    /// Original filename as uploaded
    pub filename: String,

    /// Opaque locator returned by the blob store
    pub blob_locator: String,

    /// Mime type as reported at upload
    pub mime_type: String,

    /// Blob size in bytes
    pub size_bytes: i64,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// When the attachment was uploaded
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Metadata for a blob that was just written to the blob store
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Original filename
    pub filename: String,

    /// Locator the blob store returned
    pub blob_locator: String,

    /// Mime type
    pub mime_type: String,

    /// Size in bytes
    pub size_bytes: i64,
}

impl Attachment {
    /// Records metadata for blobs already written through the blob store
    ///
    /// One row per file, in upload order. `task_id` is recorded as given.
    pub async fn record_upload(
        pool: &PgPool,
        task_id: Uuid,
        uploader_id: Uuid,
        files: Vec<NewAttachment>,
    ) -> StoreResult<Vec<Self>> {
        let mut saved = Vec::with_capacity(files.len());

        for file in files {
            let attachment = sqlx::query_as::<_, Attachment>(
                r#"
                INSERT INTO attachments (task_id, user_id, filename, blob_locator, mime_type, size_bytes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, task_id, user_id, filename, blob_locator, mime_type, size_bytes,
                          is_deleted, created_at, updated_at
                "#,
            )
            .bind(task_id)
            .bind(uploader_id)
            .bind(file.filename)
            .bind(file.blob_locator)
            .bind(file.mime_type)
            .bind(file.size_bytes)
            .fetch_one(pool)
            .await?;

            saved.push(attachment);
        }

        Ok(saved)
    }

    /// Lists the non-deleted attachments of a task, oldest first
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> StoreResult<Vec<Self>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, task_id, user_id, filename, blob_locator, mime_type, size_bytes,
                   is_deleted, created_at, updated_at
            FROM attachments
            WHERE task_id = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(attachments)
    }

    /// Finds a non-deleted attachment by id, for blob fetches
    pub async fn find_active(pool: &PgPool, attachment_id: Uuid) -> StoreResult<Option<Self>> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, task_id, user_id, filename, blob_locator, mime_type, size_bytes,
                   is_deleted, created_at, updated_at
            FROM attachments
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(attachment_id)
        .fetch_optional(pool)
        .await?;

        Ok(attachment)
    }

    /// Soft-deletes the caller's own attachment
    ///
    /// Uploader-scoped exactly like comment deletion: not-owned and missing
    /// are the same `NotFound`.
    pub async fn soft_delete(
        pool: &PgPool,
        attachment_id: Uuid,
        uploader_id: Uuid,
    ) -> StoreResult<Self> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            UPDATE attachments
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            RETURNING id, task_id, user_id, filename, blob_locator, mime_type, size_bytes,
                      is_deleted, created_at, updated_at
            "#,
        )
        .bind(attachment_id)
        .bind(uploader_id)
        .fetch_optional(pool)
        .await?;

        attachment.ok_or_else(|| StoreError::not_found("attachment"))
    }
}
