//! Visit lifecycle endpoints. Every handler authorizes against its gate
//! before touching the service layer.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{authorize, gate, AuthUser};
use crate::entities::visit;
use crate::errors::ServiceError;
use crate::handlers::common::{ok, OkBody};
use crate::services::dispatch::DispatchOutcome;
use crate::services::reports::render_pdf;
use crate::services::visits::{CashFigures, InventoryItemInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartVisitRequest {
    pub branch_id: Option<i64>,
}

/// POST /api/visits/start
pub async fn start_visit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<StartVisitRequest>,
) -> Result<Json<visit::Model>, ServiceError> {
    authorize(&user, gate::VISIT_WRITE)?;
    let branch_id = payload
        .branch_id
        .ok_or_else(|| ServiceError::ValidationError("branch_id is required".into()))?;

    let visit = state.services.visits.start_visit(branch_id, user.id).await?;
    Ok(Json(visit))
}

/// POST /api/visits/:id/end
pub async fn end_visit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::VISIT_WRITE)?;
    state.services.visits.end_visit(id, user.id).await?;
    Ok(ok())
}

/// PUT /api/visits/:id/cash
pub async fn record_cash(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(figures): Json<CashFigures>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::VISIT_WRITE)?;
    state.services.visits.record_cash(id, figures).await?;
    Ok(ok())
}

#[derive(Debug, Deserialize)]
pub struct InventoryRequest {
    #[serde(default)]
    pub items: Vec<InventoryItemInput>,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub ok: bool,
    pub inserted: usize,
}

/// POST /api/visits/:id/inventory
pub async fn record_inventory(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<InventoryRequest>,
) -> Result<Json<InventoryResponse>, ServiceError> {
    authorize(&user, gate::VISIT_WRITE)?;
    let inserted = state.services.visits.record_inventory(id, payload.items).await?;
    Ok(Json(InventoryResponse { ok: true, inserted }))
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/visits/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::VISIT_WRITE)?;
    state.services.visits.add_note(id, &payload.text).await?;
    Ok(ok())
}

/// POST /api/visits/:id/submit: employee-only, scoped to the owner.
pub async fn submit_visit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::VISIT_SUBMIT)?;
    state.services.visits.submit(id, user.id).await?;
    Ok(ok())
}

/// POST /api/visits/:id/approve
pub async fn approve_visit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::VISIT_APPROVE)?;
    state.services.visits.approve(id).await?;
    Ok(ok())
}

/// GET /api/visits/:id/pdf: rendered inline.
pub async fn visit_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    authorize(&user, gate::REPORT_VIEW)?;
    let report = state.services.reports.build(id).await?;
    let bytes = render_pdf(&report)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"visit-report-{id}.pdf\""),
            ),
        ],
        bytes,
    ))
}

/// POST /api/visits/:id/send: email the report and mark the visit sent.
pub async fn send_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<DispatchOutcome>, ServiceError> {
    authorize(&user, gate::REPORT_SEND)?;
    let outcome = state.services.dispatch.send_report(id).await?;
    Ok(Json(outcome))
}
