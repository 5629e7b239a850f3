/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/signup` - Register a new user
/// - `POST /v1/auth/signin` - Login and get a token
/// - `GET  /v1/auth/profile` - The authenticated subject's record
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::auth::{identity::Subject, jwt, password};
use taskhub_shared::models::user::{CreateUser, User, UserRole};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional role (defaults to user)
    pub role: Option<UserRole>,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// Created user, hash omitted
    pub user: UserResponse,
}

/// Signin request
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Signin response
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    /// User ID
    pub user_id: String,

    /// Email the token was issued for
    pub email: String,

    /// Bearer token (1h)
    pub token: String,
}

/// User record without the credential hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub username: String,

    /// Email address
    pub email: String,

    /// Account role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Register a new user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `409 Conflict`: email already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(SignupResponse { user: user.into() }))
}

/// Login and obtain a bearer token
///
/// Unknown email and wrong password produce the same 401: signin does not
/// reveal which half was wrong.
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<Json<SigninResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, user.email.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(SigninResponse {
        user_id: user.id.to_string(),
        email: user.email,
        token,
    }))
}

/// Return the authenticated subject's record, hash omitted
pub async fn profile(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, subject.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user.into()))
}
