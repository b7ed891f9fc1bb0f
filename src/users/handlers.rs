use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::CurrentUser,
    error::AppError,
    state::AppState,
    users::{
        dto::{PublicUser, RegisterRequest, UpdateProfileRequest},
        sanitize, services, ROLE_USER,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/profile", get(get_own_profile))
        .route("/users/update", put(update_own_profile))
        .route("/users/:username", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let candidate = services::NewUser {
        username: payload.username,
        password: payload.password,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        roles: vec![ROLE_USER.to_string()],
    };
    let user = services::register_user(&state.db, candidate).await?;
    Ok((StatusCode::CREATED, Json(sanitize::project(user, &[], true))))
}

/// Admin-only lookup of another user's profile.
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    if !current.is_admin() {
        return Err(AppError::Forbidden);
    }
    let user = services::get_user_profile(&state.db, &username).await?;
    let is_self = current.username == user.username;
    Ok(Json(sanitize::project(user, &current.roles, is_self)))
}

#[instrument(skip(state))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::get_user_profile(&state.db, &current.username).await?;
    Ok(Json(sanitize::project(user, &current.roles, true)))
}

#[instrument(skip(state, payload))]
pub async fn update_own_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::update_profile(&state.db, &current.username, payload).await?;
    Ok(Json(sanitize::project(user, &current.roles, true)))
}
