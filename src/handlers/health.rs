use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health: process liveness.
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready: liveness plus a database ping.
pub async fn readiness(State(state): State<AppState>) -> Result<Json<HealthBody>, ServiceError> {
    state.db.ping().await.map_err(ServiceError::DatabaseError)?;
    Ok(Json(HealthBody {
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
