/// Task model and database operations (Task Store)
///
/// Tasks are the central entity of TaskHub. They are soft-deleted, never
/// physically removed: `is_deleted = TRUE` hides a task from every
/// active-state query while its id stays valid for the comments and
/// attachments that reference it.
///
/// Mutations are keyed the way users address tasks: by title within the
/// caller's assignments. Duplicate titles resolve deterministically to the
/// earliest-created match.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'completed', 'archived');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     assigned_to UUID NOT NULL REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::models::task::{CreateTask, Task, TaskPatch, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
/// # async fn example(pool: PgPool, creator: Uuid) -> Result<(), taskhub_shared::error::StoreError> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Ship v1".to_string(),
///     assignee_email: "bob@x.com".to_string(),
///     ..Default::default()
/// }, creator).await?;
///
/// let done = Task::update_by_title(&pool, task.assigned_to, "Ship v1", TaskPatch {
///     status: Some(TaskStatus::Completed),
///     ..Default::default()
/// }).await?;
/// assert_eq!(done.status, TaskStatus::Completed);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::user::User;
use crate::query::{order_by_sql, Pagination, SortOrder, TaskFilter, TaskSortKey};

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet (the default for new tasks)
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Completed,

    /// Hidden from active views; also forced by soft delete
    Archived,
}

impl TaskStatus {
    /// Status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Archived => "archived",
        }
    }

    /// Whether a task in this status still counts as active work
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Todo | TaskStatus::InProgress)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Lowest urgency
    Low,

    /// Normal urgency (the default for new tasks)
    #[default]
    Medium,

    /// Elevated urgency
    High,

    /// Highest urgency
    Urgent,
}

impl TaskPriority {
    /// Priority as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Title; also the user-facing addressing key for mutations
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Lifecycle status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional calendar due date
    pub due_date: Option<NaiveDate>,

    /// Free-form tags
    pub tags: Vec<String>,

    /// User the task is assigned to (immutable after creation)
    pub assigned_to: Uuid,

    /// User who created the task (immutable after creation)
    pub created_by: Uuid,

    /// Soft-delete flag; deleted tasks are invisible to active-state queries
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title (required, non-empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Tags
    pub tags: Vec<String>,

    /// Email of the user the task is assigned to (must exist)
    pub assignee_email: String,
}

/// Whitelisted mutable fields for task updates
///
/// Only `title`, `description` and `status` ever change after creation;
/// assignment and authorship are immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title (renames the task)
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// One page of a task listing
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Number of rows matching the filter, counted before pagination
    pub total: i64,

    /// 1-indexed page number that was fetched
    pub page: u32,

    /// Page size that was applied
    pub limit: i64,

    /// The rows of this page
    pub items: Vec<Task>,
}

// Subquery that pins title-keyed mutations to one deterministic row when
// titles are duplicated: earliest created, then smallest id.
const OWNED_BY_TITLE: &str = "(SELECT id FROM tasks \
     WHERE assigned_to = $1 AND title = $2 AND is_deleted = FALSE \
     ORDER BY created_at ASC, id ASC LIMIT 1)";

impl Task {
    /// Creates a new task
    ///
    /// The assignee is resolved by email against the Identity Store; the
    /// reference must exist at creation time.
    ///
    /// # Errors
    ///
    /// - `StoreError::Validation` when the title is empty
    /// - `StoreError::NotFound` when no user has the assignee email
    pub async fn create(pool: &PgPool, data: CreateTask, created_by: Uuid) -> StoreResult<Self> {
        if data.title.trim().is_empty() {
            return Err(StoreError::validation("title", "title is required"));
        }

        let assignee = User::find_by_email(pool, &data.assignee_email)
            .await?
            .ok_or_else(|| StoreError::not_found("assigned user"))?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date, tags, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, status, priority, due_date, tags,
                      assigned_to, created_by, is_deleted, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .bind(data.tags)
        .bind(assignee.id)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists non-deleted tasks matching `filter`, sorted and paginated
    ///
    /// `total` counts every match before the page window is applied, so it
    /// is independent of `page`/`limit`. The count and the page fetch are
    /// two statements; a write landing between them can make them drift,
    /// a documented property of the single-snapshot model.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        sort_by: TaskSortKey,
        order: SortOrder,
        page: Pagination,
    ) -> StoreResult<TaskPage> {
        let where_sql = filter.where_sql(1);

        let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", where_sql);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status);
        }
        if let Some(priority) = filter.priority {
            count_query = count_query.bind(priority);
        }
        if let Some(pattern) = filter.search_pattern() {
            count_query = count_query.bind(pattern);
        }
        let (total,) = count_query.fetch_one(pool).await?;

        let next_bind = filter.bind_count() + 1;
        let select_sql = format!(
            "SELECT id, title, description, status, priority, due_date, tags, \
                    assigned_to, created_by, is_deleted, created_at, updated_at \
             FROM tasks WHERE {} {} LIMIT ${} OFFSET ${}",
            where_sql,
            order_by_sql(sort_by, order),
            next_bind,
            next_bind + 1,
        );
        let mut select_query = sqlx::query_as::<_, Task>(&select_sql);
        if let Some(status) = filter.status {
            select_query = select_query.bind(status);
        }
        if let Some(priority) = filter.priority {
            select_query = select_query.bind(priority);
        }
        if let Some(pattern) = filter.search_pattern() {
            select_query = select_query.bind(pattern);
        }
        let items = select_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(TaskPage {
            total,
            page: page.page(),
            limit: page.limit(),
            items,
        })
    }

    /// Returns one active task assigned to `user_id`
    ///
    /// Active means `status IN (todo, in_progress)` and not deleted. When
    /// several match, the earliest-created (then smallest-id) task wins.
    pub async fn find_assigned_active(pool: &PgPool, user_id: Uuid) -> StoreResult<Option<Self>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date, tags,
                   assigned_to, created_by, is_deleted, created_at, updated_at
            FROM tasks
            WHERE assigned_to = $1
              AND status IN ('todo', 'in_progress')
              AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Resolves a non-deleted task by title
    ///
    /// The comment store addresses tasks this way. Earliest-created wins
    /// when titles are duplicated.
    pub async fn find_active_by_title(pool: &PgPool, title: &str) -> StoreResult<Option<Self>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, priority, due_date, tags,
                   assigned_to, created_by, is_deleted, created_at, updated_at
            FROM tasks
            WHERE title = $1 AND is_deleted = FALSE
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a patch to the caller's task addressed by title
    ///
    /// Only the whitelisted fields present in `patch` are written;
    /// `updated_at` is always touched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no non-deleted task with that
    /// title is assigned to `owner_id`.
    pub async fn update_by_title(
        pool: &PgPool,
        owner_id: Uuid,
        title: &str,
        patch: TaskPatch,
    ) -> StoreResult<Self> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = {} RETURNING id, title, description, status, priority, due_date, tags, \
             assigned_to, created_by, is_deleted, created_at, updated_at",
            OWNED_BY_TITLE
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(owner_id).bind(title);

        if let Some(new_title) = patch.title {
            q = q.bind(new_title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }

        let task = q.fetch_optional(pool).await?;

        task.ok_or_else(|| StoreError::not_found("task"))
    }

    /// Soft-deletes the caller's task addressed by title
    ///
    /// Sets `is_deleted = TRUE` and forces `status = archived`. The record
    /// stays in the table; comments and attachments keep referencing it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no non-deleted match exists,
    /// including when the task was already soft-deleted, so a second
    /// identical call fails rather than silently succeeding.
    pub async fn soft_delete_by_title(
        pool: &PgPool,
        owner_id: Uuid,
        title: &str,
    ) -> StoreResult<Self> {
        let sql = format!(
            "UPDATE tasks SET is_deleted = TRUE, status = 'archived', updated_at = NOW() \
             WHERE id = {} RETURNING id, title, description, status, priority, due_date, tags, \
             assigned_to, created_by, is_deleted, created_at, updated_at",
            OWNED_BY_TITLE
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(title)
            .fetch_optional(pool)
            .await?;

        task.ok_or_else(|| StoreError::not_found("task"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(TaskStatus::Archived.as_str(), "archived");
    }

    #[test]
    fn test_status_is_active() {
        assert!(TaskStatus::Todo.is_active());
        assert!(TaskStatus::InProgress.is_active());
        assert!(!TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Archived.is_active());
    }

    #[test]
    fn test_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let status: TaskStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let result: Result<TaskStatus, _> = serde_json::from_str("\"done\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Urgent.as_str(), "urgent");
    }

    #[test]
    fn test_create_task_defaults() {
        let data = CreateTask::default();
        assert!(data.title.is_empty());
        assert!(data.status.is_none());
        assert!(data.tags.is_empty());
    }

    #[test]
    fn test_patch_default_is_empty() {
        let patch = TaskPatch::default();
        assert!(patch.title.is_none());
        assert!(patch.description.is_none());
        assert!(patch.status.is_none());
    }

    // Store operations are covered by the API crate's integration tests.
}
