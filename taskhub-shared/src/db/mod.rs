/// Database layer
///
/// - `pool`: PostgreSQL connection pool lifecycle
/// - `migrations`: embedded sqlx migrations

pub mod migrations;
pub mod pool;
