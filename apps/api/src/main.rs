//! Freightdesk permission API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use freightdesk_application::{
    EffectivePermissionResolver, MenuConfigRepository, MenuService, PermissionAdminService,
    PermissionCache, PermissionChangeSource, PermissionService, PermissionSourceRepository,
    run_invalidation_listener,
};
use freightdesk_core::AppError;
use freightdesk_infrastructure::{
    InMemoryPermissionCache, InMemoryPermissionRepository, PgChangeListener,
    PostgresMenuRepository, PostgresPermissionRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let cache: Arc<dyn PermissionCache> =
        Arc::new(InMemoryPermissionCache::with_ttl(config.cache_ttl));

    let repository: Arc<dyn PermissionSourceRepository>;
    let menu_repository: Option<Arc<dyn MenuConfigRepository>>;

    match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to run migrations: {error}"))
                })?;

            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            let change_listener = PgChangeListener::connect(database_url).await?;
            tokio::spawn(run_invalidation_listener(
                cache.clone(),
                change_listener.subscribe(),
            ));

            repository = Arc::new(PostgresPermissionRepository::new(pool.clone()));
            menu_repository = Some(Arc::new(PostgresMenuRepository::new(pool)));
        }
        None => {
            warn!("DATABASE_URL is not set; serving a seeded in-memory store");
            let store = Arc::new(InMemoryPermissionRepository::new());
            dev_seed::seed(store.as_ref()).await?;
            repository = store.clone();
            menu_repository = Some(store);
        }
    }

    let resolver = EffectivePermissionResolver::new(repository.clone(), cache.clone())
        .with_fetch_timeout(config.fetch_timeout);
    let permission_service = PermissionService::new(resolver);
    let admin_service = PermissionAdminService::new(
        repository,
        cache.clone(),
        permission_service.clone(),
    );
    let menu_service = MenuService::new(menu_repository, cache);

    // Warm the shared datasets so the first request resolves from cache.
    permission_service.refresh().await;

    let app_state = AppState {
        permission_service,
        admin_service,
        menu_service,
    };

    let protected_routes = Router::new()
        .route(
            "/api/permissions/context",
            get(handlers::permissions::context_handler),
        )
        .route(
            "/api/permissions/check",
            get(handlers::permissions::check_handler),
        )
        .route(
            "/api/projects",
            get(handlers::permissions::list_projects_handler),
        )
        .route("/api/menu", get(handlers::menu::menu_handler))
        .route("/api/menu/url-access", get(handlers::menu::url_access_handler))
        .route(
            "/api/admin/role-templates",
            get(handlers::admin::list_role_templates_handler)
                .put(handlers::admin::save_role_template_handler),
        )
        .route(
            "/api/admin/role-templates/{role}",
            delete(handlers::admin::delete_role_template_handler),
        )
        .route(
            "/api/admin/users/{user_id}/overrides",
            get(handlers::admin::list_user_overrides_handler),
        )
        .route(
            "/api/admin/overrides",
            put(handlers::admin::save_user_overrides_handler),
        )
        .route(
            "/api/admin/overrides/reset",
            post(handlers::admin::reset_overrides_handler),
        )
        .route(
            "/api/admin/overrides/apply-template",
            post(handlers::admin::apply_template_handler),
        )
        .route(
            "/api/admin/overrides/copy",
            post(handlers::admin::copy_permissions_handler),
        )
        .route(
            "/api/admin/users/roles",
            post(handlers::admin::bulk_update_roles_handler),
        )
        .route(
            "/api/admin/users/status",
            post(handlers::admin::bulk_update_status_handler),
        )
        .route(
            "/api/admin/cache/refresh",
            post(handlers::admin::refresh_cache_handler),
        )
        .route_layer(from_fn(middleware::require_identity));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-user-name"),
            HeaderName::from_static("x-user-email"),
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "freightdesk-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
