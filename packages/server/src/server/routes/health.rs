use axum::http::StatusCode;

/// Liveness check with a static body. Does not touch the database.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
