use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use handlers::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/verify-otp", post(handlers::auth::verify_otp))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/images/generate", post(handlers::images::generate))
        .route("/api/images/my-images", get(handlers::images::my_images))
        .layer(TraceLayer::new_for_http())
        // The browser frontend is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
