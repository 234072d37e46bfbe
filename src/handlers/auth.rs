use axum::extract::State;
use axum::Json;

use crate::auth::{LoginRequest, LoginResponse};
use crate::errors::ServiceError;
use crate::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ServiceError::ValidationError(
            "email and password are required".into(),
        ));
    }

    let response = state.auth.login(payload.email.trim(), &payload.password).await?;
    Ok(Json(response))
}
