//! Reference data: companies, branches, and branch report recipients.
//!
//! Reads are available to every authenticated role; mutation is gated at
//! the handler layer. Deletes are idempotent: removing an absent row
//! succeeds.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::entities::{branch, branch_recipient, company};
use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CompanyInput {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchInput {
    pub company_id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientInput {
    pub branch_id: i64,
    pub name: String,
    pub email: String,
    #[serde(default = "default_notify")]
    pub notify_email: bool,
}

fn default_notify() -> bool {
    true
}

#[derive(Clone)]
pub struct ReferenceService {
    db: Arc<DatabaseConnection>,
}

impl ReferenceService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_companies(&self) -> Result<Vec<company::Model>, ServiceError> {
        company::Entity::find()
            .order_by_asc(company::Column::Name)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Branches, optionally narrowed to one company.
    pub async fn list_branches(
        &self,
        company_id: Option<i64>,
    ) -> Result<Vec<branch::Model>, ServiceError> {
        let mut query = branch::Entity::find().order_by_asc(branch::Column::Name);
        if let Some(company_id) = company_id {
            query = query.filter(branch::Column::CompanyId.eq(company_id));
        }
        query.all(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    pub async fn list_recipients(
        &self,
        branch_id: Option<i64>,
    ) -> Result<Vec<branch_recipient::Model>, ServiceError> {
        let mut query =
            branch_recipient::Entity::find().order_by_asc(branch_recipient::Column::Id);
        if let Some(branch_id) = branch_id {
            query = query.filter(branch_recipient::Column::BranchId.eq(branch_id));
        }
        query.all(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_company(
        &self,
        input: CompanyInput,
    ) -> Result<company::Model, ServiceError> {
        validate_name(&input.name, "company name")?;
        let model = company::ActiveModel {
            name: Set(input.name.trim().to_string()),
            ..Default::default()
        };
        let created = model.insert(&*self.db).await.map_err(ServiceError::DatabaseError)?;
        info!(company_id = created.id, "company created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_company(
        &self,
        id: i64,
        input: CompanyInput,
    ) -> Result<company::Model, ServiceError> {
        validate_name(&input.name, "company name")?;
        let existing = company::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("company {id} not found")))?;

        let mut active: company::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.update(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn delete_company(&self, id: i64) -> Result<(), ServiceError> {
        company::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(company_id = id, "company deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_branch(&self, input: BranchInput) -> Result<branch::Model, ServiceError> {
        validate_name(&input.name, "branch name")?;
        let model = branch::ActiveModel {
            company_id: Set(input.company_id),
            name: Set(input.name.trim().to_string()),
            location: Set(input.location),
            ..Default::default()
        };
        let created = model.insert(&*self.db).await.map_err(ServiceError::DatabaseError)?;
        info!(branch_id = created.id, company_id = created.company_id, "branch created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_branch(
        &self,
        id: i64,
        input: BranchInput,
    ) -> Result<branch::Model, ServiceError> {
        validate_name(&input.name, "branch name")?;
        let existing = branch::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("branch {id} not found")))?;

        let mut active: branch::ActiveModel = existing.into();
        active.company_id = Set(input.company_id);
        active.name = Set(input.name.trim().to_string());
        active.location = Set(input.location);
        active.update(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn delete_branch(&self, id: i64) -> Result<(), ServiceError> {
        branch::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(branch_id = id, "branch deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_recipient(
        &self,
        input: RecipientInput,
    ) -> Result<branch_recipient::Model, ServiceError> {
        validate_name(&input.name, "recipient name")?;
        validate_email(&input.email)?;
        let model = branch_recipient::ActiveModel {
            branch_id: Set(input.branch_id),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            notify_email: Set(input.notify_email),
            ..Default::default()
        };
        let created = model.insert(&*self.db).await.map_err(ServiceError::DatabaseError)?;
        info!(recipient_id = created.id, branch_id = created.branch_id, "recipient created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_recipient(
        &self,
        id: i64,
        input: RecipientInput,
    ) -> Result<branch_recipient::Model, ServiceError> {
        validate_name(&input.name, "recipient name")?;
        validate_email(&input.email)?;
        let existing = branch_recipient::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("recipient {id} not found")))?;

        let mut active: branch_recipient::ActiveModel = existing.into();
        active.branch_id = Set(input.branch_id);
        active.name = Set(input.name.trim().to_string());
        active.email = Set(input.email.trim().to_string());
        active.notify_email = Set(input.notify_email);
        active.update(&*self.db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn delete_recipient(&self, id: i64) -> Result<(), ServiceError> {
        branch_recipient::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(recipient_id = id, "recipient deleted");
        Ok(())
    }
}

fn validate_name(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ServiceError> {
    let value = value.trim();
    if value.is_empty() || !value.contains('@') {
        return Err(ServiceError::ValidationError(
            "a valid email address is required".into(),
        ));
    }
    Ok(())
}
