use std::sync::Arc;

use axum::{extract::Extension, Json};

use crate::app::{dto, services::AppServices};

/// Liveness probe. Does not touch the store.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> Json<dto::HealthResponse> {
    Json(dto::HealthResponse {
        status: "ok",
        store: services.backend(),
    })
}
