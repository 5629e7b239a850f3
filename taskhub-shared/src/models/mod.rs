/// Entity stores
///
/// One module per entity, each owning its schema and database operations:
///
/// - `user`: user records, the leaf dependency for the rest
/// - `task`: soft-deletable tasks with status/priority enums
/// - `comment`: author-owned, task-scoped comments
/// - `attachment`: blob metadata records over the blob store

pub mod attachment;
pub mod comment;
pub mod task;
pub mod user;
