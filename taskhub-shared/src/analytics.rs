/// Analytics aggregation over the Task Store
///
/// Read-only aggregate passes, all scoped to one user's assignments
/// (`assigned_to = user AND is_deleted = FALSE`):
///
/// - [`status_breakdown`]: task count per status value
/// - [`performance`]: totals, overdue count, completion rate, average
///   completion time
/// - [`trends`]: per-UTC-day creation/completion counts
///
/// The derived math (rate, mean) lives in pure helpers so it can be tested
/// without a database.
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::task::TaskStatus;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Task count for one status value
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    /// Status value
    pub status: TaskStatus,

    /// Number of non-deleted tasks in that status
    pub count: i64,
}

/// Per-user performance snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSnapshot {
    /// Non-deleted tasks assigned to the user
    pub total_tasks: i64,

    /// Of those, tasks with status completed
    pub completed_tasks: i64,

    /// Tasks not completed whose due date has passed
    pub overdue_tasks: i64,

    /// completed / total as a percentage; 0 when the user has no tasks
    pub completion_rate: f64,

    /// Mean of (updated_at - created_at) over completed tasks, in days;
    /// 0 when nothing is completed
    pub avg_completion_days: f64,
}

/// One day of the trend series
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrendPoint {
    /// UTC calendar day the tasks were created on
    pub date: NaiveDate,

    /// Tasks created that day
    pub total_tasks: i64,

    /// Of those, tasks currently completed
    pub completed_tasks: i64,
}

/// Completion rate as a percentage, 0 when `total` is zero
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// Converts a mean duration in seconds to days, 0 when absent
pub fn mean_days(mean_seconds: Option<f64>) -> f64 {
    mean_seconds.map_or(0.0, |secs| secs / SECONDS_PER_DAY)
}

/// Counts the user's non-deleted tasks per status value
pub async fn status_breakdown(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<StatusCount>> {
    let counts = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM tasks
        WHERE assigned_to = $1 AND is_deleted = FALSE
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Computes the user's performance snapshot
///
/// Overdue means the due day has fully passed (`due_date < CURRENT_DATE`)
/// and the task is not completed. Completion time is measured from creation
/// to the last update of the completed task.
pub async fn performance(pool: &PgPool, user_id: Uuid) -> StoreResult<PerformanceSnapshot> {
    let (total, completed, overdue, mean_seconds): (i64, i64, i64, Option<f64>) =
        sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'completed'),
                   COUNT(*) FILTER (WHERE status <> 'completed' AND due_date < CURRENT_DATE),
                   (AVG(EXTRACT(EPOCH FROM (updated_at - created_at)))
                       FILTER (WHERE status = 'completed'))::DOUBLE PRECISION
            FROM tasks
            WHERE assigned_to = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(PerformanceSnapshot {
        total_tasks: total,
        completed_tasks: completed,
        overdue_tasks: overdue,
        completion_rate: completion_rate(completed, total),
        avg_completion_days: mean_days(mean_seconds),
    })
}

/// Builds the per-day trend series for the user's tasks
///
/// Days are UTC calendar days of task creation, ascending; days without
/// tasks produce no row.
pub async fn trends(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<TrendPoint>> {
    let points = sqlx::query_as::<_, TrendPoint>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::DATE AS date,
               COUNT(*) AS total_tasks,
               COUNT(*) FILTER (WHERE status = 'completed') AS completed_tasks
        FROM tasks
        WHERE assigned_to = $1 AND is_deleted = FALSE
        GROUP BY 1
        ORDER BY 1 ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(points)
}

/// One row of the CSV export of a user's tasks
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskExportRow {
    /// Task title
    pub title: String,

    /// Description, empty when absent
    pub description: Option<String>,

    /// Status wire value
    pub status: TaskStatus,

    /// Priority wire value
    pub priority: crate::models::task::TaskPriority,

    /// Due date, empty when absent
    pub due_date: Option<NaiveDate>,

    /// Tags joined with commas
    pub tags: String,

    /// Assignee email
    pub assigned_to_email: String,

    /// Creator email
    pub created_by_email: String,
}

/// Fetches the user's non-deleted tasks in export shape, oldest first
pub async fn export_rows(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<TaskExportRow>> {
    let rows = sqlx::query_as::<_, TaskExportRow>(
        r#"
        SELECT t.title,
               t.description,
               t.status,
               t.priority,
               t.due_date,
               ARRAY_TO_STRING(t.tags, ',') AS tags,
               a.email AS assigned_to_email,
               c.email AS created_by_email
        FROM tasks t
        JOIN users a ON a.id = t.assigned_to
        JOIN users c ON c.id = t.created_by
        WHERE t.assigned_to = $1 AND t.is_deleted = FALSE
        ORDER BY t.created_at ASC, t.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
