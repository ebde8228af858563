use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/index.html", get(handlers::index))
        .route("/dashboard.html", get(handlers::dashboard))
        .route("/app.js", get(handlers::script))
        .route("/api/submit", post(handlers::submit))
        .route("/api/data", get(handlers::get_data))
        .route("/api/update-status", post(handlers::update_status))
        .route("/api/update-priority", post(handlers::update_priority))
        .route("/api/delete-request", post(handlers::delete_request))
        .route("/api/export-csv", get(handlers::export_csv))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
