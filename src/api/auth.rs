//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{BorrowerRole, RegisterUser, User},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login or registration response with JWT token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration in seconds
    pub expires_in: i64,
    pub user: User,
}

/// Current user information
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub roles: Vec<String>,
    /// Role used for lending rules, absent when no role is recognized
    pub effective_role: Option<BorrowerRole>,
}

impl LoginResponse {
    fn new(token: String, user: User, expiration_hours: u64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in: expiration_hours as i64 * 3600,
            user,
        }
    }
}

/// Authenticate user and get JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse::new(
        token,
        user,
        state.config.auth.jwt_expiration_hours,
    )))
}

/// Register a new account with the guest role
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or identification already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let (token, user) = state.services.users.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse::new(
            token,
            user,
            state.config.auth.jwt_expiration_hours,
        )),
    ))
}

/// Get current user information
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = UserInfo),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<UserInfo> {
    Json(UserInfo {
        id: claims.user_id,
        email: claims.sub.clone(),
        effective_role: claims.role(),
        roles: claims.roles,
    })
}
