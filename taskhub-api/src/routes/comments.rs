/// Comment endpoints
///
/// # Endpoints
///
/// - `POST   /v1/comments` - Add a comment to a task, addressed by title
/// - `GET    /v1/comments?task_title=...` - List a task's comments
/// - `PUT    /v1/comments/:id` - Update own comment
/// - `DELETE /v1/comments/:id` - Soft-delete own comment
///
/// Update and delete are author-scoped; a non-author gets the same 404 as
/// for a comment that does not exist.
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskhub_shared::auth::identity::Subject;
use taskhub_shared::models::comment::Comment;
use uuid::Uuid;
use validator::Validate;

/// Add-comment request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Title of the task to comment on
    #[validate(length(min = 1, message = "Task title is required"))]
    pub task_title: String,

    /// Comment body
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    /// Title of the task whose comments to list
    pub task_title: String,
}

/// Update-comment request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    /// New comment body
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Single-comment response
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Confirmation message
    pub message: String,

    /// The comment after the operation
    pub comment: Comment,
}

/// Comment-list response
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    /// Non-deleted comments, most recent first
    pub comments: Vec<Comment>,
}

/// Add a comment to a non-deleted task
///
/// # Errors
///
/// - `404 Not Found`: no non-deleted task has that title
/// - `422 Unprocessable Entity`: empty content
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    req.validate()?;

    let comment = Comment::add(&state.db, &req.task_title, subject.id, &req.content).await?;

    Ok(Json(CommentResponse {
        message: "Comment added successfully".to_string(),
        comment,
    }))
}

/// List a task's non-deleted comments, most recent first
pub async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> ApiResult<Json<CommentListResponse>> {
    let comments = Comment::list_for_task(&state.db, &query.task_title).await?;

    Ok(Json(CommentListResponse { comments }))
}

/// Update the caller's own comment
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    req.validate()?;

    let comment = Comment::update(&state.db, comment_id, subject.id, &req.content).await?;

    Ok(Json(CommentResponse {
        message: "Comment updated".to_string(),
        comment,
    }))
}

/// Soft-delete the caller's own comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Json<CommentResponse>> {
    let comment = Comment::soft_delete(&state.db, comment_id, subject.id).await?;

    Ok(Json(CommentResponse {
        message: "Comment deleted successfully".to_string(),
        comment,
    }))
}
