//! Site-status gate for top-level page requests.
//!
//! The site config is read fresh on every gated request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth;
use crate::errors::AppError;
use crate::models::SiteConfig;
use crate::AppState;

pub const MAINTENANCE_PATH: &str = "/maintenance";
pub const SHOP_CLOSED_PATH: &str = "/shop-closed";

/// Set after a correct maintenance password; lets the holder through maintenance mode.
pub const BYPASS_COOKIE: &str = "maintenance_bypass";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectMaintenance,
    RedirectShopClosed,
}

/// Paths the gate never redirects.
fn is_exempt(path: &str) -> bool {
    path == MAINTENANCE_PATH
        || path == SHOP_CLOSED_PATH
        || path == "/health"
        || path == "/admin"
        || path.starts_with("/admin/")
        || path == "/api"
        || path.starts_with("/api/")
}

/// Decide what to do with a page request given the current config.
///
/// `may_bypass` is true when the request carries the bypass cookie or an admin session.
pub fn evaluate(path: &str, config: &SiteConfig, may_bypass: bool) -> GateDecision {
    if is_exempt(path) {
        return GateDecision::Allow;
    }
    if config.maintenance_mode && !may_bypass {
        return GateDecision::RedirectMaintenance;
    }
    if config.shop_closed {
        return GateDecision::RedirectShopClosed;
    }
    GateDecision::Allow
}

pub fn has_bypass(jar: &CookieJar) -> bool {
    jar.get(BYPASS_COOKIE).is_some_and(|c| c.value() == "true")
}

pub fn bypass_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((BYPASS_COOKIE, "true"))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// True when the session cookie names an existing user, as [`auth::require_admin`] demands.
async fn has_admin_session(state: &AppState, jar: &CookieJar) -> Result<bool, AppError> {
    match auth::session_username(jar) {
        Some(username) => Ok(state.repo.get_user_by_username(&username).await?.is_some()),
        None => Ok(false),
    }
}

/// Middleware redirecting page requests according to the site config.
pub async fn site_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = state.repo.get_site_config().await?;
    let may_bypass = has_bypass(&jar) || has_admin_session(&state, &jar).await?;

    match evaluate(request.uri().path(), &config, may_bypass) {
        GateDecision::Allow => Ok(next.run(request).await),
        GateDecision::RedirectMaintenance => {
            tracing::debug!("Maintenance mode: redirecting {}", request.uri().path());
            Ok(Redirect::temporary(MAINTENANCE_PATH).into_response())
        }
        GateDecision::RedirectShopClosed => {
            tracing::debug!("Shop closed: redirecting {}", request.uri().path());
            Ok(Redirect::temporary(SHOP_CLOSED_PATH).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(maintenance_mode: bool, shop_closed: bool) -> SiteConfig {
        SiteConfig {
            maintenance_mode,
            shop_closed,
            maintenance_password: "letmein".to_string(),
        }
    }

    #[test]
    fn test_open_site_allows_everything() {
        assert_eq!(evaluate("/", &config(false, false), false), GateDecision::Allow);
        assert_eq!(
            evaluate("/shop/hoodie", &config(false, false), false),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_maintenance_wins_over_shop_closed() {
        assert_eq!(
            evaluate("/", &config(true, true), false),
            GateDecision::RedirectMaintenance
        );
    }

    #[test]
    fn test_bypass_skips_maintenance_only() {
        assert_eq!(evaluate("/", &config(true, false), true), GateDecision::Allow);
        assert_eq!(
            evaluate("/", &config(true, true), true),
            GateDecision::RedirectShopClosed
        );
    }

    #[test]
    fn test_target_pages_never_loop() {
        let locked = config(true, true);
        assert_eq!(evaluate(MAINTENANCE_PATH, &locked, false), GateDecision::Allow);
        assert_eq!(evaluate(SHOP_CLOSED_PATH, &locked, false), GateDecision::Allow);
    }

    #[test]
    fn test_admin_and_api_are_exempt() {
        let locked = config(true, true);
        assert_eq!(evaluate("/admin", &locked, false), GateDecision::Allow);
        assert_eq!(evaluate("/admin/orders", &locked, false), GateDecision::Allow);
        assert_eq!(evaluate("/api/rides", &locked, false), GateDecision::Allow);
        assert_eq!(
            evaluate("/administrator", &locked, false),
            GateDecision::RedirectMaintenance
        );
    }

    #[test]
    fn test_bypass_cookie_value_must_match() {
        let jar = CookieJar::new().add(Cookie::new(BYPASS_COOKIE, "true"));
        assert!(has_bypass(&jar));
        let forged = CookieJar::new().add(Cookie::new(BYPASS_COOKIE, "yes"));
        assert!(!has_bypass(&forged));
        assert!(!has_bypass(&CookieJar::new()));
    }
}
