//! Riders Club Backend
//!
//! Storefront and back-office REST backend persisting to flat JSON files.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod print;
mod site;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use models::Permission;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Riders Club Backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    let repo = Arc::new(db::init_repository(&config.data_dir, bcrypt::DEFAULT_COST).await?);

    match config.bootstrap_admin() {
        Some((username, password)) => {
            if repo.ensure_bootstrap_admin(username, password).await? {
                tracing::info!("Created bootstrap admin {}", username);
            }
        }
        None => {
            if repo.list_users().await?.is_empty() {
                tracing::warn!(
                    "No users exist and RIDERS_ADMIN_USERNAME/RIDERS_ADMIN_PASSWORD are unset; nobody can log in"
                );
            }
        }
    }

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Wrap `router` so only admins holding `permission` reach it.
fn with_permission(router: Router<AppState>, permission: Permission) -> Router<AppState> {
    router.layer(middleware::from_fn(move |req, next| {
        auth::require_permission(permission, req, next)
    }))
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public API routes
    let public_routes = Router::new()
        .route("/site-status", get(api::get_site_status))
        .route("/maintenance/unlock", post(api::unlock_maintenance))
        // Auth
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        // Catalog
        .route("/products", get(api::list_public_products))
        .route("/products/{slug}", get(api::get_public_product))
        .route("/categories", get(api::list_categories))
        // Orders
        .route("/orders", post(api::create_order))
        // Rides
        .route("/rides", get(api::list_public_rides))
        .route("/rides/{id}", get(api::get_public_ride))
        .route("/rides/{id}/register", post(api::register_for_ride))
        // Albums
        .route("/albums", get(api::list_public_albums))
        .route("/albums/{id}", get(api::get_public_album));

    let ride_routes = Router::new()
        .route("/rides", get(api::list_rides).post(api::create_ride))
        .route(
            "/rides/{id}",
            get(api::get_ride)
                .put(api::update_ride)
                .delete(api::delete_ride),
        )
        .route("/rides/{id}/participants", get(api::list_participants))
        .route(
            "/rides/{id}/participants/{participant_id}",
            delete(api::delete_participant),
        );

    let album_routes = Router::new()
        .route("/albums", get(api::list_albums).post(api::create_album))
        .route(
            "/albums/{id}",
            get(api::get_album)
                .put(api::update_album)
                .delete(api::delete_album),
        )
        .route("/albums/{id}/media", post(api::add_album_media))
        .route("/albums/{id}/media/order", put(api::reorder_album_media))
        .route(
            "/albums/{id}/media/{media_id}",
            delete(api::remove_album_media),
        )
        .route("/albums/{id}/cover", put(api::set_album_cover));

    let order_routes = Router::new()
        .route(
            "/orders",
            get(api::list_orders).post(api::create_admin_order),
        )
        .route("/orders/print", get(api::print_orders))
        .route("/orders/export", get(api::export_orders))
        .route(
            "/orders/{id}",
            get(api::get_order)
                .put(api::update_order)
                .delete(api::delete_order),
        );

    let product_routes = Router::new()
        .route("/products", get(api::list_products).post(api::create_product))
        .route(
            "/products/{id}",
            get(api::get_product)
                .put(api::update_product)
                .delete(api::delete_product),
        )
        .route("/categories", post(api::create_category))
        .route(
            "/categories/{id}",
            put(api::update_category).delete(api::delete_category),
        );

    let user_routes = Router::new()
        .route("/users", get(api::list_users).post(api::create_user))
        .route(
            "/users/{id}",
            put(api::update_user).delete(api::delete_user),
        );

    let settings_routes = Router::new().route(
        "/site-config",
        get(api::get_site_config).put(api::update_site_config),
    );

    // Admin routes: session required, then a permission per area
    let admin_routes = Router::new()
        .merge(with_permission(ride_routes, Permission::Rides))
        .merge(with_permission(album_routes, Permission::Albums))
        .merge(with_permission(order_routes, Permission::Orders))
        .merge(with_permission(product_routes, Permission::Products))
        .merge(with_permission(user_routes, Permission::Users))
        .merge(with_permission(settings_routes, Permission::Settings))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let session_routes = Router::new()
        .route("/auth/me", get(api::me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    // Storefront pages behind the site-status gate
    let page_routes = Router::new()
        .route("/", get(api::page))
        .route("/shop", get(api::page))
        .route("/shop/{slug}", get(api::page))
        .route("/cart", get(api::page))
        .route("/checkout", get(api::page))
        .route("/rides", get(api::page))
        .route("/rides/{id}", get(api::page))
        .route("/albums", get(api::page))
        .route("/albums/{id}", get(api::page))
        .route(site::MAINTENANCE_PATH, get(api::page))
        .route(site::SHOP_CLOSED_PATH, get(api::page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            site::site_gate,
        ));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest(
            "/api",
            public_routes
                .merge(session_routes)
                .nest("/admin", admin_routes),
        )
        .merge(page_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
