use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::dispatch::DispatchService;
use crate::services::mailer::Mailer;
use crate::services::reference::ReferenceService;
use crate::services::reports::ReportService;
use crate::services::users::UserService;
use crate::services::visits::VisitService;

pub mod admin;
pub mod auth;
pub mod common;
pub mod health;
pub mod reference;
pub mod visits;

/// Aggregate of the domain services handlers call into.
#[derive(Clone)]
pub struct AppServices {
    pub visits: VisitService,
    pub reference: ReferenceService,
    pub users: UserService,
    pub reports: ReportService,
    pub dispatch: DispatchService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        mailer: Arc<dyn Mailer>,
        organization: String,
    ) -> Self {
        let visits = VisitService::new(db.clone());
        let reports = ReportService::new(db.clone(), organization);
        let dispatch =
            DispatchService::new(db.clone(), reports.clone(), visits.clone(), mailer);

        Self {
            visits,
            reference: ReferenceService::new(db.clone()),
            users: UserService::new(db),
            reports,
            dispatch,
        }
    }
}
