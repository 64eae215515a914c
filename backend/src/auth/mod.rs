//! Cookie-based admin authentication.
//!
//! The session cookie carries the username; a request is authenticated when
//! that username exists in the user file. Area access is gated per permission.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::{Permission, User};
use crate::AppState;

/// Cookie holding the logged-in username.
pub const SESSION_COOKIE: &str = "admin_session";
/// Older cookie name still accepted on read.
pub const LEGACY_SESSION_COOKIE: &str = "session";

/// The authenticated admin, inserted into request extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))
    }
}

/// Username carried by the session cookie, if any.
pub fn session_username(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .or_else(|| jar.get(LEGACY_SESSION_COOKIE))
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(username: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, username.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Expire both session cookie names.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
        .remove(Cookie::build(LEGACY_SESSION_COOKIE).path("/"))
}

/// Reject requests without a session naming an existing user.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(username) = session_username(&jar) else {
        return Err(AppError::Unauthorized("Not logged in".to_string()));
    };

    let user = state
        .repo
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Session cookie names unknown user {}", username);
            AppError::Unauthorized("Session is no longer valid".to_string())
        })?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Reject requests whose admin lacks `permission`. Must run inside [`require_admin`].
pub async fn require_permission(
    permission: Permission,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return Err(AppError::Unauthorized("Not logged in".to_string()));
    };

    if !user.has_permission(permission) {
        tracing::warn!(
            "User {} denied access to {}",
            user.username,
            permission.as_str()
        );
        return Err(AppError::Forbidden(format!(
            "Missing permission: {}",
            permission.as_str()
        )));
    }

    Ok(next.run(request).await)
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
