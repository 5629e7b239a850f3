/// Task endpoints
///
/// # Endpoints
///
/// - `POST   /v1/tasks` - Create a task
/// - `GET    /v1/tasks` - List tasks (filter, sort, paginate)
/// - `GET    /v1/tasks/assigned` - One active task assigned to the caller
/// - `PUT    /v1/tasks` - Update the caller's task, addressed by title
/// - `DELETE /v1/tasks` - Soft-delete the caller's task, addressed by title
///
/// Mutations address tasks by title within the caller's assignments, the
/// way the UI presents them.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::Query, extract::State, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskhub_shared::auth::identity::Subject;
use taskhub_shared::models::task::{CreateTask, Task, TaskPage, TaskPatch, TaskPriority, TaskStatus};
use taskhub_shared::query::{Pagination, SortOrder, TaskFilter, TaskSortKey};
use validator::Validate;

/// Create-task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Due date as `YYYY-MM-DD`
    pub due_date: Option<String>,

    /// Email of the assignee (must reference an existing user)
    #[validate(email(message = "Invalid assignee email"))]
    pub email: String,
}

/// Create-task response
#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    /// Confirmation message
    pub message: String,

    /// The created task
    pub task: Task,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// 1-indexed page (default 1)
    pub page: Option<u32>,

    /// Page size (default 10, capped)
    pub limit: Option<u32>,

    /// Exact status filter
    pub status: Option<TaskStatus>,

    /// Exact priority filter
    pub priority: Option<TaskPriority>,

    /// Case-insensitive title substring filter
    pub search: Option<String>,

    /// Sort key (default due_date)
    pub sort_by: Option<TaskSortKey>,

    /// Sort direction (default asc)
    pub order: Option<SortOrder>,
}

/// Update-task request; the task is addressed by its current title
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// Current title of the task to update
    pub title: String,

    /// New title, if renaming
    pub new_title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Delete-task request
#[derive(Debug, Deserialize)]
pub struct DeleteTaskRequest {
    /// Title of the task to soft-delete
    pub title: String,
}

/// Task mutation response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Confirmation message
    pub message: String,

    /// The task after the mutation
    pub task: Task,
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing title or malformed due date
/// - `404 Not Found`: no user has the assignee email
pub async fn create_task(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<CreateTaskResponse>> {
    req.validate()?;

    let due_date = parse_due_date(req.due_date.as_deref())?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date,
            tags: req.tags,
            assignee_email: req.email,
        },
        subject.id,
    )
    .await?;

    tracing::info!(task_id = %task.id, "Task created");

    Ok(Json(CreateTaskResponse {
        message: "Task created".to_string(),
        task,
    }))
}

/// List non-deleted tasks with filtering, sorting and pagination
///
/// `total` counts every match before pagination, so it is independent of
/// `page` and `limit`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskPage>> {
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        search: query.search,
    };
    let page = Pagination::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));

    let result = Task::list(
        &state.db,
        &filter,
        query.sort_by.unwrap_or_default(),
        query.order.unwrap_or_default(),
        page,
    )
    .await?;

    Ok(Json(result))
}

/// Return one active (todo or in-progress) task assigned to the caller
///
/// # Errors
///
/// - `404 Not Found`: nothing active is assigned to the caller
pub async fn assigned_task(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_assigned_active(&state.db, subject.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No task available".to_string()))?;

    Ok(Json(task))
}

/// Update the caller's task, addressed by its current title
///
/// Only `{title, description, status}` are mutable; assignment and
/// authorship never change.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::update_by_title(
        &state.db,
        subject.id,
        &req.title,
        TaskPatch {
            title: req.new_title,
            description: req.description,
            status: req.status,
        },
    )
    .await?;

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task,
    }))
}

/// Soft-delete the caller's task, addressed by title
///
/// The task is archived and disappears from listings; its id stays valid
/// for comments and attachments. Deleting the same title again is a 404.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<DeleteTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    if req.title.trim().is_empty() {
        return Err(ApiError::invalid_field("title", "Title is required"));
    }

    let task = Task::soft_delete_by_title(&state.db, subject.id, &req.title).await?;

    Ok(Json(TaskResponse {
        message: "Task deleted".to_string(),
        task,
    }))
}

// Due dates arrive as strings; anything that is not a real calendar date in
// `YYYY-MM-DD` form is rejected before it reaches the store.
fn parse_due_date(raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::invalid_field("due_date", "Invalid due_date")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_absent() {
        assert_eq!(parse_due_date(None).unwrap(), None);
    }

    #[test]
    fn test_parse_due_date_valid() {
        let date = parse_due_date(Some("2026-03-01")).unwrap();
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        assert!(parse_due_date(Some("not-a-date")).is_err());
        assert!(parse_due_date(Some("2026-13-01")).is_err());
        assert!(parse_due_date(Some("2026-02-30")).is_err());
    }

    #[test]
    fn test_list_query_deserializes_from_url_params() {
        let query: ListTasksQuery =
            serde_urlencoded::from_str("page=2&limit=5&status=in-progress&order=desc").unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.status, Some(TaskStatus::InProgress));
        assert_eq!(query.order, Some(SortOrder::Desc));
        assert_eq!(query.sort_by, None);
    }
}
