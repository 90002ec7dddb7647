//! Warehouse Management Platform - Backend Server
//!
//! Multi-tenant inventory backend: warehouses, product catalogs, orders that
//! move stock, inter-warehouse transfers, cash transactions and sales analytics.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cache;
mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

pub use config::Config;

use cache::WarehouseSelection;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub selection: WarehouseSelection,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::Config::load()?;

    tracing::info!("Starting Warehouse Management Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    if config.is_development() {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let addr = config.bind_address();
    let state = AppState {
        db: db_pool,
        config: Arc::new(config),
        selection: WarehouseSelection::new(),
    };

    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Plain text logs by default, JSON lines when `WMS_LOG_FORMAT=json`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wms_server=debug,tower_http=debug,sqlx=warn".into());
    let json = std::env::var("WMS_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Warehouse Management Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::State,
        http::{header, Request, StatusCode},
        response::IntoResponse,
        Json,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::middleware::{AuthUser, CurrentUser};
    use crate::models::UserRole;
    use crate::services::auth::issue_test_token;
    use crate::services::warehouse::WarehouseInput;

    fn test_app() -> Router {
        create_app(test_state())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");

        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_protected_route_rejects_bad_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/orders")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let token = issue_test_token(Uuid::new_v4(), UserRole::Superuser, "other-secret", 300);
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn regular_user() -> CurrentUser {
        CurrentUser(AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::User,
        })
    }

    fn test_state() -> AppState {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy(&config.database.url)
            .unwrap();

        AppState {
            db,
            config: Arc::new(config),
            selection: WarehouseSelection::new(),
        }
    }

    #[tokio::test]
    async fn test_regular_user_cannot_create_warehouse() {
        let input = WarehouseInput {
            name: "North".to_string(),
            location: "Depot 4".to_string(),
        };
        let response =
            match handlers::create_warehouse(State(test_state()), regular_user(), Json(input)).await {
                Ok(_) => panic!("regular users must not create warehouses"),
                Err(err) => err.into_response(),
            };
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INSUFFICIENT_PERMISSIONS");
    }

    #[tokio::test]
    async fn test_company_status_is_empty_for_regular_users() {
        let response = handlers::get_company_status(State(test_state()), regular_user())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_valid_token_is_checked_against_the_account() {
        let token = issue_test_token(Uuid::new_v4(), UserRole::Superuser, "test-secret", 300);
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // No reachable database: the account lookup fails before any handler runs
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_api_health_reports_database_state() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["database"].is_string());
    }
}
