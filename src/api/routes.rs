//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use crate::api::websocket::ws_handler;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Call results pushed to subscribers
        .route("/ws", get(ws_handler))
        // Currency
        .route(
            "/api/currency",
            get(handlers::get_currency).post(handlers::create_currency),
        )
        .route("/api/audit", get(handlers::audit))
        // Accounts
        .route(
            "/api/accounts",
            get(handlers::list_accounts).post(handlers::open_account),
        )
        .route(
            "/api/accounts/{address}/balance",
            get(handlers::get_balance),
        )
        .route("/api/allowance", get(handlers::get_allowance))
        // Transactions
        .route("/api/transfer", post(handlers::transfer))
        .route("/api/approve", post(handlers::approve))
        .route("/api/transferFrom", post(handlers::transfer_from))
        .route("/api/increaseAllowance", post(handlers::increase_allowance))
        .route("/api/decreaseAllowance", post(handlers::decrease_allowance))
        .route("/api/mint", post(handlers::mint))
        .route("/api/burn", post(handlers::burn))
        .route("/api/burnFrom", post(handlers::burn_from))
        // Generic entry point
        .route("/api/call", post(handlers::call))
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
