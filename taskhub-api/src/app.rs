/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::{build_router, AppState}, config::Config};
/// use taskhub_shared::storage::DiskStore;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let blobs = Arc::new(DiskStore::new(&config.storage.upload_dir));
/// let state = AppState::new(pool, config, blobs);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::{identity::Subject, jwt};
use taskhub_shared::models::user::User;
use taskhub_shared::storage::BlobStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the pool
/// and blob store are cheap handles, the config sits behind an Arc.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Blob store backing attachments
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            blobs,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (versioned)
///     ├── /auth/
///     │   ├── POST /signup           # Register (public)
///     │   ├── POST /signin           # Login (public)
///     │   └── GET  /profile          # Authenticated subject
///     ├── /tasks/                    # Authenticated
///     │   ├── POST   /               # Create task
///     │   ├── GET    /               # List (filter/sort/paginate)
///     │   ├── GET    /assigned       # One active assigned task
///     │   ├── PUT    /               # Update by title
///     │   ├── DELETE /               # Soft delete by title
///     │   └── /:task_id/attachments  # Upload (POST) / list (GET)
///     ├── /comments/                 # Authenticated
///     │   ├── POST   /               # Add to a task by title
///     │   ├── GET    /               # List for a task by title
///     │   ├── PUT    /:id            # Update own comment
///     │   └── DELETE /:id            # Soft delete own comment
///     ├── /attachments/              # Authenticated
///     │   ├── GET    /:id/download   # Fetch blob
///     │   └── DELETE /:id            # Soft delete own attachment
///     └── /analytics/                # Authenticated, read-only
///         ├── GET /overview
///         ├── GET /performance
///         ├── GET /trends
///         └── GET /export            # CSV
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let public_auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin));

    // Profile requires a verified subject
    let profile_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/", get(routes::tasks::list_tasks))
        .route("/assigned", get(routes::tasks::assigned_task))
        .route("/", put(routes::tasks::update_task))
        .route("/", delete(routes::tasks::delete_task))
        .route(
            "/:task_id/attachments",
            post(routes::attachments::upload_attachments),
        )
        .route(
            "/:task_id/attachments",
            get(routes::attachments::list_attachments),
        );

    let comment_routes = Router::new()
        .route("/", post(routes::comments::add_comment))
        .route("/", get(routes::comments::list_comments))
        .route("/:id", put(routes::comments::update_comment))
        .route("/:id", delete(routes::comments::delete_comment));

    let attachment_routes = Router::new()
        .route("/:id/download", get(routes::attachments::download_attachment))
        .route("/:id", delete(routes::attachments::delete_attachment));

    let analytics_routes = Router::new()
        .route("/overview", get(routes::analytics::overview))
        .route("/performance", get(routes::analytics::performance))
        .route("/trends", get(routes::analytics::trends))
        .route("/export", get(routes::analytics::export_tasks));

    // Everything except signup/signin runs behind the subject resolver
    let protected_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/comments", comment_routes)
        .nest("/attachments", attachment_routes)
        .nest("/analytics", analytics_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(profile_routes))
        .merge(protected_routes);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware
///
/// Validates the bearer token, then resolves the subject identity against
/// the Identity Store once for the whole request. Handlers downstream
/// extract the `Subject` from request extensions and never see credentials.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // The token may outlive the account; the store is authoritative.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown subject".to_string()))?;

    req.extensions_mut().insert(Subject::from(&user));

    Ok(next.run(req).await)
}
