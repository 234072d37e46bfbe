//! Visit lifecycle: `open` → `submitted` → `approved` | `sent`.
//!
//! Transitions deliberately do not validate the prior status and carry no
//! cross-request locking: two racing submissions or approvals are
//! last-write-wins. Both are observed source behavior kept pending a
//! product decision; see DESIGN.md.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::entities::{visit, visit_cash, visit_inventory_item, visit_note};
use crate::errors::ServiceError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VisitStatus {
    Open,
    Submitted,
    Approved,
    Sent,
}

/// Cash reconciliation figures; absent fields default to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct CashFigures {
    #[serde(default)]
    pub system_balance: Decimal,
    #[serde(default)]
    pub actual_balance: Decimal,
    #[serde(default)]
    pub sales_amount: Decimal,
}

/// One row of an inventory batch.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItemInput {
    pub item_name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub system_qty: i32,
    #[serde(default)]
    pub actual_qty: i32,
}

#[derive(Clone)]
pub struct VisitService {
    db: Arc<DatabaseConnection>,
}

impl VisitService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Open a new visit for the given branch, owned by the requesting
    /// employee.
    #[instrument(skip(self))]
    pub async fn start_visit(
        &self,
        branch_id: i64,
        employee_id: i64,
    ) -> Result<visit::Model, ServiceError> {
        let now = Utc::now();
        let model = visit::ActiveModel {
            branch_id: Set(branch_id),
            employee_id: Set(employee_id),
            status: Set(VisitStatus::Open.to_string()),
            started_at: Set(now),
            ended_at: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };

        let visit = model.insert(&*self.db).await.map_err(|e| {
            error!(error = %e, branch_id, "failed to create visit");
            ServiceError::DatabaseError(e)
        })?;

        info!(visit_id = visit.id, branch_id, employee_id, "visit started");
        Ok(visit)
    }

    /// Record the end timestamp, scoped to the owning employee. A visit
    /// owned by someone else matches zero rows and is a silent no-op.
    #[instrument(skip(self))]
    pub async fn end_visit(&self, visit_id: i64, employee_id: i64) -> Result<(), ServiceError> {
        visit::Entity::update_many()
            .col_expr(visit::Column::EndedAt, Expr::value(Utc::now()))
            .col_expr(visit::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(visit::Column::Id.eq(visit_id))
            .filter(visit::Column::EmployeeId.eq(employee_id))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    /// Upsert the single cash record for a visit (insert, or replace on
    /// `visit_id` conflict).
    #[instrument(skip(self, figures))]
    pub async fn record_cash(
        &self,
        visit_id: i64,
        figures: CashFigures,
    ) -> Result<(), ServiceError> {
        let model = visit_cash::ActiveModel {
            visit_id: Set(visit_id),
            system_balance: Set(figures.system_balance),
            actual_balance: Set(figures.actual_balance),
            sales_amount: Set(figures.sales_amount),
            recorded_at: Set(Utc::now()),
            ..Default::default()
        };

        visit_cash::Entity::insert(model)
            .on_conflict(
                OnConflict::column(visit_cash::Column::VisitId)
                    .update_columns([
                        visit_cash::Column::SystemBalance,
                        visit_cash::Column::ActualBalance,
                        visit_cash::Column::SalesAmount,
                        visit_cash::Column::RecordedAt,
                    ])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await
            .map_err(|e| {
                error!(error = %e, visit_id, "failed to upsert cash record");
                ServiceError::DatabaseError(e)
            })?;

        info!(visit_id, "cash record upserted");
        Ok(())
    }

    /// Insert an inventory batch atomically: one transaction, one row per
    /// item. Any row failure rolls the whole batch back before the
    /// connection is released, so partial writes are never observable.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn record_inventory(
        &self,
        visit_id: i64,
        items: Vec<InventoryItemInput>,
    ) -> Result<usize, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "inventory item list is empty".into(),
            ));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, visit_id, "failed to begin inventory transaction");
            ServiceError::DatabaseError(e)
        })?;

        let count = items.len();
        for (index, item) in items.into_iter().enumerate() {
            if let Err(e) = Self::validate_item(index, &item) {
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(e);
            }

            let row = visit_inventory_item::ActiveModel {
                visit_id: Set(visit_id),
                item_name: Set(item.item_name),
                color: Set(item.color),
                size: Set(item.size),
                system_qty: Set(item.system_qty),
                actual_qty: Set(item.actual_qty),
                ..Default::default()
            };

            if let Err(e) = row.insert(&txn).await {
                error!(error = %e, visit_id, index, "inventory row insert failed; rolling back");
                txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                return Err(ServiceError::DatabaseError(e));
            }
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, visit_id, "failed to commit inventory batch");
            ServiceError::DatabaseError(e)
        })?;

        info!(visit_id, count, "inventory batch recorded");
        Ok(count)
    }

    fn validate_item(index: usize, item: &InventoryItemInput) -> Result<(), ServiceError> {
        if item.item_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "inventory item {index}: name is required"
            )));
        }
        if item.system_qty < 0 || item.actual_qty < 0 {
            return Err(ServiceError::ValidationError(format!(
                "inventory item {index}: quantities must be non-negative"
            )));
        }
        Ok(())
    }

    /// Append a free-text note, timestamped for ordered retrieval.
    #[instrument(skip(self, text))]
    pub async fn add_note(&self, visit_id: i64, text: &str) -> Result<(), ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::ValidationError("note text is required".into()));
        }

        let note = visit_note::ActiveModel {
            visit_id: Set(visit_id),
            note_text: Set(text.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        note.insert(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    /// Transition to `submitted`, restricted to the owning employee: the
    /// update matches on both visit id and owner, so a cross-employee
    /// submission silently affects zero rows.
    #[instrument(skip(self))]
    pub async fn submit(&self, visit_id: i64, employee_id: i64) -> Result<(), ServiceError> {
        visit::Entity::update_many()
            .col_expr(
                visit::Column::Status,
                Expr::value(VisitStatus::Submitted.to_string()),
            )
            .col_expr(visit::Column::EndedAt, Expr::value(Utc::now()))
            .col_expr(visit::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(visit::Column::Id.eq(visit_id))
            .filter(visit::Column::EmployeeId.eq(employee_id))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(visit_id, employee_id, "visit submitted");
        Ok(())
    }

    /// Transition to `approved`; not ownership-scoped.
    #[instrument(skip(self))]
    pub async fn approve(&self, visit_id: i64) -> Result<(), ServiceError> {
        self.set_status(visit_id, VisitStatus::Approved).await?;
        info!(visit_id, "visit approved");
        Ok(())
    }

    /// Transition to `sent`, recorded after a successful report dispatch.
    #[instrument(skip(self))]
    pub async fn mark_sent(&self, visit_id: i64) -> Result<(), ServiceError> {
        self.set_status(visit_id, VisitStatus::Sent).await?;
        info!(visit_id, "visit marked sent");
        Ok(())
    }

    async fn set_status(&self, visit_id: i64, status: VisitStatus) -> Result<(), ServiceError> {
        visit::Entity::update_many()
            .col_expr(visit::Column::Status, Expr::value(status.to_string()))
            .col_expr(visit::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(visit::Column::Id.eq(visit_id))
            .exec(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

}
