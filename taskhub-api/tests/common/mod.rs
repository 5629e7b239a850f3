/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (migrations run on first connect)
/// - Test user creation with unique emails
/// - JWT token generation
/// - Request/response helpers over the in-process router
///
/// Tests exercise the real router against a real PostgreSQL instance. When
/// `DATABASE_URL` is not set, [`TestContext::new`] returns `None` and each
/// test skips itself, so the suite stays green without infrastructure.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, StorageConfig};
use taskhub_shared::auth::jwt::{create_token, Claims};
use taskhub_shared::db::migrations::run_migrations;
use taskhub_shared::models::user::{CreateUser, User, UserRole};
use taskhub_shared::storage::DiskStore;
use tower::Service;
use uuid::Uuid;

/// Secret used to sign test tokens
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context, or `None` when `DATABASE_URL` is unset
    pub async fn new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping: DATABASE_URL not set");
                return None;
            }
        };

        let db = PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");

        run_migrations(&db).await.expect("migrations failed");

        let upload_dir = std::env::temp_dir()
            .join(format!("taskhub-test-uploads-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            storage: StorageConfig {
                upload_dir: upload_dir.clone(),
            },
        };

        let blobs = DiskStore::new(&upload_dir);
        blobs.ensure_root().await.expect("upload dir creation failed");

        let state = AppState::new(db.clone(), config, Arc::new(blobs));
        let app = build_router(state);

        let (user, token) = create_test_user(&db, UserRole::User).await;

        Some(Self {
            db,
            app,
            user,
            token,
        })
    }
}

/// Creates a user with a unique email and a valid token for it
pub async fn create_test_user(db: &PgPool, role: UserRole) -> (User, String) {
    let suffix = Uuid::new_v4();
    let user = User::create(
        db,
        CreateUser {
            username: format!("test-user-{}", suffix),
            email: format!("test-{}@example.com", suffix),
            // Valid argon2id hash of an unused password; signin is tested
            // separately through the signup flow.
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$K0N8WQeCe4u0yFtXN4Fi5w".to_string(),
            role,
        },
    )
    .await
    .expect("test user creation failed");

    let claims = Claims::new(user.id, user.email.clone(), user.role);
    let token = create_token(&claims, TEST_JWT_SECRET).expect("token creation failed");

    (user, token)
}

/// Sends a JSON request through the router and returns status + JSON body
pub async fn send_json(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Sends a request and returns status, headers and raw body bytes
pub async fn send_raw(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }

    let request = builder.body(Body::from(body)).unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, bytes.to_vec())
}

/// Builds a single-file multipart body with the given boundary
pub fn multipart_file(boundary: &str, filename: &str, mime: &str, content: &str) -> Vec<u8> {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
         Content-Type: {mime}\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    )
    .into_bytes()
}

/// Creates a task through the API and returns its JSON representation
pub async fn create_task_via_api(
    ctx: &TestContext,
    token: &str,
    title: &str,
    assignee_email: &str,
    extra: Value,
) -> Value {
    let mut body = serde_json::json!({
        "title": title,
        "email": assignee_email,
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut body, extra) {
        base.extend(extra);
    }

    let (status, json) = send_json(ctx, "POST", "/v1/tasks", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "task creation failed: {}", json);

    json["task"].clone()
}
