//! Site status, maintenance bypass and site config endpoints.

use axum::{extract::State, http::Uri};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::{success, ApiJson, ApiResponse, ApiResult};
use crate::auth::constant_time_compare;
use crate::errors::AppError;
use crate::models::{SiteConfig, SiteStatus, UnlockRequest, UpdateSiteConfigRequest};
use crate::site::bypass_cookie;
use crate::AppState;

/// GET /api/site-status - Public maintenance/shop flags.
pub async fn get_site_status(State(state): State<AppState>) -> ApiResult<SiteStatus> {
    let config = state.repo.get_site_config().await?;
    success(SiteStatus::from(&config))
}

/// POST /api/maintenance/unlock - Set the bypass cookie on a correct password.
pub async fn unlock_maintenance(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<UnlockRequest>,
) -> Result<(CookieJar, ApiResponse<SiteStatus>), AppError> {
    let config = state.repo.get_site_config().await?;

    if config.maintenance_password.is_empty()
        || !constant_time_compare(&request.password, &config.maintenance_password)
    {
        tracing::warn!("Rejected maintenance unlock attempt");
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }

    let jar = jar.add(bypass_cookie(state.config.secure_cookies));
    Ok((jar, ApiResponse::new(SiteStatus::from(&config))))
}

/// GET /api/admin/site-config - Full site config including the maintenance password.
pub async fn get_site_config(State(state): State<AppState>) -> ApiResult<SiteConfig> {
    success(state.repo.get_site_config().await?)
}

/// PUT /api/admin/site-config - Toggle maintenance mode / shop closed.
pub async fn update_site_config(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateSiteConfigRequest>,
) -> ApiResult<SiteConfig> {
    success(state.repo.update_site_config(&request).await?)
}

/// What a storefront page request resolves to once past the gate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub path: String,
    pub status: SiteStatus,
}

/// Storefront page routes. Rendering happens in the frontend; this reports the path served.
pub async fn page(State(state): State<AppState>, uri: Uri) -> ApiResult<PageInfo> {
    let config = state.repo.get_site_config().await?;
    success(PageInfo {
        path: uri.path().to_string(),
        status: SiteStatus::from(&config),
    })
}
