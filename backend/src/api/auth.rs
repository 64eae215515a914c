//! Admin login/logout endpoints.

use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::auth::{clear_session, session_cookie, CurrentUser};
use crate::errors::AppError;
use crate::models::{LoginRequest, PublicUser};
use crate::AppState;

/// POST /api/auth/login - Verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<PublicUser>), AppError> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let Some(user) = state
        .repo
        .verify_credentials(username, &request.password)
        .await?
    else {
        tracing::warn!("Failed login for {}", username);
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    tracing::info!("User {} logged in", user.username);
    let jar = jar.add(session_cookie(&user.username, state.config.secure_cookies));
    Ok((jar, ApiResponse::new(PublicUser::from(user))))
}

/// POST /api/auth/logout - Clear the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiResponse<()>) {
    (clear_session(jar), ApiResponse::new(()))
}

/// GET /api/auth/me - The logged-in admin.
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<PublicUser> {
    success(PublicUser::from(user))
}
