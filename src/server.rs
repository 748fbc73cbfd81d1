use axum::{
    Json, Router,
    routing::{get, post},
};
use log::info;

use crate::data::{TimetableOutput, TimetableRequest};
use crate::solver;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

// Each request gets its own engine state; nothing mutable is shared.
async fn generate_handler(Json(input): Json<TimetableRequest>) -> Json<TimetableOutput> {
    Json(solver::generate_timetable(input))
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/health", get(health_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await
}
