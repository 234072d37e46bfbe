//! Report dispatch: resolve the visit's branch recipients, render the PDF,
//! send a single email, and mark the visit `sent`.

use std::sync::Arc;

use lettre::message::Mailbox;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::entities::branch_recipient;
use crate::errors::ServiceError;
use crate::services::mailer::{Mailer, OutgoingReport};
use crate::services::reports::{render_pdf, ReportService};
use crate::services::visits::VisitService;

/// Outcome returned to the caller; `emails_sent` counts recipients of the
/// single outgoing message, and is zero when nobody was eligible.
#[derive(Debug, Serialize)]
pub struct DispatchOutcome {
    pub visit_id: i64,
    pub emails_sent: usize,
}

#[derive(Clone)]
pub struct DispatchService {
    db: Arc<DatabaseConnection>,
    reports: ReportService,
    visits: VisitService,
    mailer: Arc<dyn Mailer>,
}

impl DispatchService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        reports: ReportService,
        visits: VisitService,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            reports,
            visits,
            mailer,
        }
    }

    /// Send the visit report to every opted-in branch recipient with a
    /// parseable address. With zero eligible recipients the email step is
    /// skipped entirely; in every successful path the visit ends `sent`.
    #[instrument(skip(self))]
    pub async fn send_report(&self, visit_id: i64) -> Result<DispatchOutcome, ServiceError> {
        let report = self.reports.build(visit_id).await?;

        let recipients = branch_recipient::Entity::find()
            .filter(branch_recipient::Column::BranchId.eq(report.branch_id))
            .filter(branch_recipient::Column::NotifyEmail.eq(true))
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mailboxes: Vec<Mailbox> = recipients
            .iter()
            .filter_map(|r| match r.email.parse::<Mailbox>() {
                Ok(mailbox) => Some(mailbox),
                Err(_) => {
                    warn!(recipient_id = r.id, "skipping recipient with unparseable address");
                    None
                }
            })
            .collect();

        let emails_sent = mailboxes.len();
        if !mailboxes.is_empty() {
            let pdf = render_pdf(&report)?;
            let subject = format!(
                "Field visit report #{} - {} / {}",
                report.visit_id, report.company_name, report.branch_name
            );
            let body = format!(
                "Attached is the field visit report for {} ({}), inspected by {}.",
                report.branch_name, report.company_name, report.employee_name
            );

            self.mailer
                .send(OutgoingReport {
                    to: mailboxes,
                    subject,
                    body,
                    attachment_name: format!("visit-report-{}.pdf", report.visit_id),
                    pdf,
                })
                .await?;
        } else {
            info!(visit_id, "no eligible recipients; skipping email");
        }

        self.visits.mark_sent(visit_id).await?;
        info!(visit_id, emails_sent, "report dispatched");

        Ok(DispatchOutcome {
            visit_id,
            emails_sent,
        })
    }
}
