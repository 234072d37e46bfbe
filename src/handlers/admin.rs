//! Administrative CRUD for reference data and user accounts.
//!
//! Managers and admins share the create/update surface; every delete is
//! admin-only.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::{authorize, gate, AuthUser, UserProfile};
use crate::entities::{branch, branch_recipient, company};
use crate::errors::ServiceError;
use crate::handlers::common::{ok, OkBody};
use crate::services::reference::{BranchInput, CompanyInput, RecipientInput};
use crate::services::users::{CreateUserInput, UpdateUserInput};
use crate::AppState;

// --- companies ---

pub async fn list_companies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<company::Model>>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.list_companies().await?))
}

pub async fn create_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CompanyInput>,
) -> Result<Json<company::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.create_company(input).await?))
}

pub async fn update_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<CompanyInput>,
) -> Result<Json<company::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.update_company(id, input).await?))
}

pub async fn delete_company(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::ADMIN_DELETE)?;
    state.services.reference.delete_company(id).await?;
    Ok(ok())
}

// --- branches ---

#[derive(Debug, Deserialize)]
pub struct BranchQuery {
    pub company_id: Option<i64>,
}

pub async fn list_branches(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<Vec<branch::Model>>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(
        state.services.reference.list_branches(query.company_id).await?,
    ))
}

pub async fn create_branch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<BranchInput>,
) -> Result<Json<branch::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.create_branch(input).await?))
}

pub async fn update_branch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<BranchInput>,
) -> Result<Json<branch::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.update_branch(id, input).await?))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::ADMIN_DELETE)?;
    state.services.reference.delete_branch(id).await?;
    Ok(ok())
}

// --- recipients ---

#[derive(Debug, Deserialize)]
pub struct RecipientQuery {
    pub branch_id: Option<i64>,
}

pub async fn list_recipients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecipientQuery>,
) -> Result<Json<Vec<branch_recipient::Model>>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(
        state.services.reference.list_recipients(query.branch_id).await?,
    ))
}

pub async fn create_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<RecipientInput>,
) -> Result<Json<branch_recipient::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.create_recipient(input).await?))
}

pub async fn update_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<RecipientInput>,
) -> Result<Json<branch_recipient::Model>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.reference.update_recipient(id, input).await?))
}

pub async fn delete_recipient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::ADMIN_DELETE)?;
    state.services.reference.delete_recipient(id).await?;
    Ok(ok())
}

// --- users ---

pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.users.list().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateUserInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.users.create(input).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<UserProfile>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    Ok(Json(state.services.users.update(id, input).await?))
}

#[derive(Debug, Deserialize)]
pub struct PasswordInput {
    pub password: String,
}

pub async fn set_user_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(input): Json<PasswordInput>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::ADMIN_MANAGE)?;
    state.services.users.set_password(id, &input.password).await?;
    Ok(ok())
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<OkBody>, ServiceError> {
    authorize(&user, gate::ADMIN_DELETE)?;
    state.services.users.delete(id).await?;
    Ok(ok())
}
