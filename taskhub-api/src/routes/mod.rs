/// API route handlers
///
/// One module per resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (signup, signin, profile)
/// - `tasks`: Task CRUD and listing
/// - `comments`: Task comments
/// - `attachments`: File attachments
/// - `analytics`: Per-user analytics and CSV export

pub mod analytics;
pub mod attachments;
pub mod auth;
pub mod comments;
pub mod health;
pub mod tasks;
