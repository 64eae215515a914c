//! Admin user management endpoints.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{CreateUserRequest, PublicUser, UpdateUserRequest};
use crate::AppState;

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    let users = state.repo.list_users().await?;
    success(users.into_iter().map(PublicUser::from).collect())
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<PublicUser> {
    success(PublicUser::from(state.repo.create_user(&request).await?))
}

/// PUT /api/admin/users/:id - Change password and/or permissions.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<PublicUser> {
    success(PublicUser::from(state.repo.update_user(&id, &request).await?))
}

/// DELETE /api/admin/users/:id - Admins cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if current.id == id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }
    state.repo.delete_user(&id).await?;
    success(())
}
