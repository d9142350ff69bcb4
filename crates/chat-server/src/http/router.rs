//! Axum router.
//!
//! Routes live under `/api/`. When a web directory is configured the built
//! browser client is served for every other path. The protected-route gate
//! wraps both.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::{gate, handlers};
use crate::state::AppState;

pub fn build_router(state: AppState, web_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/debug/db-check", get(handlers::db_check))
        .route("/api/health", get(handlers::health));

    if let Some(dir) = web_dir.filter(|d| std::path::Path::new(d).exists()) {
        let index = format!("{}/index.html", dir);
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
        log::info!("Serving web client from {}", dir);
    } else {
        router = router.fallback(handlers::not_found);
    }

    router
        .layer(middleware::from_fn_with_state(state.clone(), gate::protected_route_gate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
