//! Route definitions for the warehouse management API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .merge(protected_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

/// Everything behind bearer authentication
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .route("/company/status", get(handlers::get_company_status))
        .nest("/warehouses", warehouse_routes())
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/transfers", transfer_routes())
        .nest("/transactions", transaction_routes())
        .nest("/analytics", analytics_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User account routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_user))
        .route("/me", get(handlers::get_me))
        .route("/password", post(handlers::change_password))
}

/// Warehouse management routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route("/current", get(handlers::get_current_warehouse))
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route("/:warehouse_id/select", post(handlers::select_warehouse))
        .route("/:warehouse_id/members", post(handlers::add_member))
        .route(
            "/:warehouse_id/members/:user_id",
            delete(handlers::remove_member),
        )
}

/// Category routes (current warehouse)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
}

/// Product routes (current warehouse)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/finished", get(handlers::list_finished_products))
        .route("/low", get(handlers::list_low_products))
        .route("/export", get(handlers::export_products))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Order routes (current warehouse)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/range", get(handlers::list_orders_in_range))
        .route(
            "/:order_id",
            get(handlers::get_order).delete(handlers::delete_order),
        )
}

/// Transfer routes (current warehouse as source)
fn transfer_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_transfers).post(handlers::create_transfer),
    )
}

/// Cash transaction routes (current warehouse)
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_cash_transactions).post(handlers::create_cash_transaction),
        )
        .route(
            "/:transaction_id",
            get(handlers::get_cash_transaction)
                .put(handlers::update_cash_transaction)
                .delete(handlers::delete_cash_transaction),
        )
}

/// Analytics routes (current warehouse)
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/daily", get(handlers::get_daily_sales))
        .route("/monthly", get(handlers::get_monthly_sales))
        .route("/sales", get(handlers::get_sales_in_range))
        .route("/summary", get(handlers::get_summary))
        .route("/report", get(handlers::get_monthly_report))
}
