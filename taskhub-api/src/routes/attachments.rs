/// Attachment endpoints
///
/// # Endpoints
///
/// - `POST   /v1/tasks/:task_id/attachments` - Upload files (multipart)
/// - `GET    /v1/tasks/:task_id/attachments` - List a task's attachments
/// - `GET    /v1/attachments/:id/download` - Fetch the blob
/// - `DELETE /v1/attachments/:id` - Soft-delete own attachment
///
/// Bytes flow through the blob store; the database only holds metadata.
/// Uploads do not verify the task reference; that is the designed
/// behavior of the store.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use taskhub_shared::auth::identity::Subject;
use taskhub_shared::models::attachment::{Attachment, NewAttachment};
use uuid::Uuid;

const OCTET_STREAM: &str = "application/octet-stream";

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Confirmation message
    pub message: String,

    /// One record per uploaded file, in upload order
    pub attachments: Vec<Attachment>,
}

/// Attachment-list response
#[derive(Debug, Serialize)]
pub struct AttachmentListResponse {
    /// Non-deleted attachments, oldest first
    pub attachments: Vec<Attachment>,
}

/// Attachment mutation response
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    /// Confirmation message
    pub message: String,

    /// The attachment after the operation
    pub attachment: Attachment,
}

/// Upload one or more files to a task
///
/// Accepts multipart form data; every file part becomes one attachment.
///
/// # Errors
///
/// - `400 Bad Request`: no file parts in the request
pub async fn upload_attachments(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(task_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut stored = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            // Non-file form fields are ignored, like any form parser does.
            None => continue,
        };
        let mime_type = field
            .content_type()
            .unwrap_or(OCTET_STREAM)
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file part: {}", e)))?;

        let size_bytes = bytes.len() as i64;
        let blob_locator = state.blobs.store(bytes, &filename).await?;

        stored.push(NewAttachment {
            filename,
            blob_locator,
            mime_type,
            size_bytes,
        });
    }

    if stored.is_empty() {
        return Err(ApiError::BadRequest("No files provided".to_string()));
    }

    let attachments = Attachment::record_upload(&state.db, task_id, subject.id, stored).await?;

    tracing::info!(task_id = %task_id, count = attachments.len(), "Files uploaded");

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        attachments,
    }))
}

/// List a task's non-deleted attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<AttachmentListResponse>> {
    let attachments = Attachment::list_for_task(&state.db, task_id).await?;

    Ok(Json(AttachmentListResponse { attachments }))
}

/// Download an attachment's blob
///
/// Replays the stored mime type and original filename.
///
/// # Errors
///
/// - `404 Not Found`: attachment missing, deleted, or blob gone
pub async fn download_attachment(
    State(state): State<AppState>,
    Path(attachment_id): Path<Uuid>,
) -> ApiResult<Response> {
    let attachment = Attachment::find_active(&state.db, attachment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let bytes = state.blobs.retrieve(&attachment.blob_locator).await?;

    let headers = [
        (header::CONTENT_TYPE, attachment.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.filename),
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// Soft-delete the caller's own attachment
///
/// The blob itself stays in the store; only the metadata row is hidden.
pub async fn delete_attachment(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(attachment_id): Path<Uuid>,
) -> ApiResult<Json<AttachmentResponse>> {
    let attachment = Attachment::soft_delete(&state.db, attachment_id, subject.id).await?;

    Ok(Json(AttachmentResponse {
        message: "File soft deleted successfully".to_string(),
        attachment,
    }))
}
