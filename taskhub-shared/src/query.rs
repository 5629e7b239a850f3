/// Query/filter engine for task listings
///
/// Pure SQL-fragment composition: no I/O happens here. The task store feeds
/// these fragments into `sqlx::query_as` and binds the filter values in the
/// order [`TaskFilter::where_sql`] numbered them.
///
/// Guarantees:
/// - every rendered predicate is anchored on `is_deleted = FALSE`
/// - ordering is total: the requested sort key is followed by
///   `created_at ASC, id ASC`, so equal keys keep insertion order
/// - pagination is 1-indexed and bounded; `total` is counted with the same
///   predicate before LIMIT/OFFSET is applied
///
/// Listing results are consistent only within a single snapshot. A write
/// landing between the count and the page fetch can make `total` drift from
/// the page contents; that is a documented property of the model, not a bug.
use serde::{Deserialize, Serialize};

use crate::models::task::{TaskPriority, TaskStatus};

/// Hard cap on page size, regardless of what the caller asks for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size when the caller does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Optional conjunctive filter over the task listing
///
/// Absent fields do not constrain the result. `search` matches the title as
/// a case-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Exact priority match
    pub priority: Option<TaskPriority>,

    /// Case-insensitive substring match on title
    pub search: Option<String>,
}

impl TaskFilter {
    /// Renders the WHERE conjunction with placeholders numbered from
    /// `first_bind`.
    ///
    /// Bind order is fixed (status, then priority, then search pattern),
    /// the same order [`Self::bind_count`] counts and callers bind in.
    pub fn where_sql(&self, first_bind: usize) -> String {
        let mut clause = String::from("is_deleted = FALSE");
        let mut bind = first_bind;

        if self.status.is_some() {
            clause.push_str(&format!(" AND status = ${}", bind));
            bind += 1;
        }
        if self.priority.is_some() {
            clause.push_str(&format!(" AND priority = ${}", bind));
            bind += 1;
        }
        if self.search.is_some() {
            clause.push_str(&format!(" AND title ILIKE ${}", bind));
        }

        clause
    }

    /// Number of placeholders [`Self::where_sql`] emits
    pub fn bind_count(&self) -> usize {
        self.status.is_some() as usize
            + self.priority.is_some() as usize
            + self.search.is_some() as usize
    }

    /// ILIKE pattern for the search term, if any
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|s| format!("%{}%", s))
    }
}

/// Sort key for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortKey {
    /// Sort by due date (the listing default)
    #[default]
    DueDate,

    /// Sort by creation time
    CreatedAt,

    /// Sort by priority (enum declaration order: low < medium < high < urgent)
    Priority,

    /// Sort by title (lexicographic)
    Title,

    /// Sort by status (enum declaration order)
    Status,
}

impl TaskSortKey {
    /// Column the key sorts on
    pub fn column(&self) -> &'static str {
        match self {
            TaskSortKey::DueDate => "due_date",
            TaskSortKey::CreatedAt => "created_at",
            TaskSortKey::Priority => "priority",
            TaskSortKey::Title => "title",
            TaskSortKey::Status => "status",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (the listing default)
    #[default]
    Asc,

    /// Descending
    Desc,
}

impl SortOrder {
    /// SQL keyword for the direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Renders the ORDER BY clause for a listing
///
/// The tie-break columns make the order total: rows with equal sort keys
/// come back in insertion order no matter the requested key or direction.
pub fn order_by_sql(key: TaskSortKey, order: SortOrder) -> String {
    format!(
        "ORDER BY {} {}, created_at ASC, id ASC",
        key.column(),
        order.as_sql()
    )
}

/// 1-indexed pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Builds a window, clamping `page` to at least 1 and `limit` into
    /// `1..=MAX_PAGE_SIZE`
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// The 1-indexed page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}
