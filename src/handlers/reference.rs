use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize, gate, AuthUser};
use crate::entities::{branch, company};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BranchQuery {
    pub company_id: Option<i64>,
}

/// GET /api/companies
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<company::Model>>, ServiceError> {
    authorize(&user, gate::REFERENCE_READ)?;
    let companies = state.services.reference.list_companies().await?;
    Ok(Json(companies))
}

/// GET /api/branches?company_id=
pub async fn list_branches(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<Vec<branch::Model>>, ServiceError> {
    authorize(&user, gate::REFERENCE_READ)?;
    let branches = state
        .services
        .reference
        .list_branches(query.company_id)
        .await?;
    Ok(Json(branches))
}
