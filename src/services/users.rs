//! User account administration. Passwords are argon2-hashed before
//! storage; the PHC string never leaves the service layer (the entity
//! skips it on serialization as a second line of defense).

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::{password, Role, UserProfile};
use crate::entities::user;
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// When present, the password is re-hashed and replaced.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_active() -> bool {
    true
}

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        users.into_iter().map(profile_from_model).collect()
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUserInput) -> Result<UserProfile, ServiceError> {
        validate_identity(&input.full_name, &input.email)?;
        validate_password(&input.password)?;

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(input.email.trim()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "a user with this email already exists".into(),
            ));
        }

        let model = user::ActiveModel {
            full_name: Set(input.full_name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            phone: Set(input.phone),
            password_hash: Set(password::hash_password(&input.password)?),
            role: Set(input.role.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await.map_err(ServiceError::DatabaseError)?;
        info!(user_id = created.id, "user created");
        profile_from_model(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: UpdateUserInput) -> Result<UserProfile, ServiceError> {
        validate_identity(&input.full_name, &input.email)?;
        if let Some(ref new_password) = input.password {
            validate_password(new_password)?;
        }

        let existing = user::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id} not found")))?;

        let mut active: user::ActiveModel = existing.into();
        active.full_name = Set(input.full_name.trim().to_string());
        active.email = Set(input.email.trim().to_string());
        active.phone = Set(input.phone);
        active.role = Set(input.role.to_string());
        active.is_active = Set(input.is_active);
        if let Some(new_password) = input.password {
            active.password_hash = Set(password::hash_password(&new_password)?);
        }

        let updated = active.update(&*self.db).await.map_err(ServiceError::DatabaseError)?;
        info!(user_id = updated.id, "user updated");
        profile_from_model(updated)
    }

    /// Replace the stored hash with one derived from the new password.
    #[instrument(skip(self, new_password))]
    pub async fn set_password(&self, id: i64, new_password: &str) -> Result<(), ServiceError> {
        validate_password(new_password)?;

        let existing = user::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id} not found")))?;

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password::hash_password(new_password)?);
        active.update(&*self.db).await.map_err(ServiceError::DatabaseError)?;

        info!(user_id = id, "password replaced");
        Ok(())
    }

    /// Idempotent removal.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        user::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn profile_from_model(model: user::Model) -> Result<UserProfile, ServiceError> {
    let role: Role = model
        .role
        .parse()
        .map_err(|_| ServiceError::InternalError(format!("unknown role '{}'", model.role)))?;
    Ok(UserProfile {
        id: model.id,
        name: model.full_name,
        email: model.email,
        phone: model.phone,
        role,
    })
}

fn validate_identity(full_name: &str, email: &str) -> Result<(), ServiceError> {
    if full_name.trim().is_empty() {
        return Err(ServiceError::ValidationError("full name is required".into()));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ServiceError::ValidationError(
            "a valid email address is required".into(),
        ));
    }
    Ok(())
}

fn validate_password(candidate: &str) -> Result<(), ServiceError> {
    if candidate.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
