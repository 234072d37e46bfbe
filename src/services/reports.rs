//! Visit report assembly and PDF rendering.
//!
//! [`ReportService::build`] gathers everything known about a visit into a
//! [`VisitReport`]; [`render_pdf`] turns that into a printable A4 document.
//! Rendering is a pure function of the report value, so the same bytes are
//! served over HTTP and attached to outgoing email.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;

use crate::entities::{branch, company, user, visit, visit_cash, visit_inventory_item, visit_note};
use crate::errors::ServiceError;

/// Cash figures for a visit. A visit without a cash record reports zeros.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CashSummary {
    pub system_balance: Decimal,
    pub actual_balance: Decimal,
    pub sales_amount: Decimal,
}

impl CashSummary {
    /// Actual minus system; negative means cash is missing.
    pub fn discrepancy(&self) -> Decimal {
        self.actual_balance - self.system_balance
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportItem {
    pub name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub system_qty: i32,
    pub actual_qty: i32,
}

impl ReportItem {
    /// Actual minus system count.
    pub fn discrepancy(&self) -> i32 {
        self.actual_qty - self.system_qty
    }
}

/// Fully resolved snapshot of one visit, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct VisitReport {
    pub visit_id: i64,
    pub branch_id: i64,
    pub organization: String,
    pub company_name: String,
    pub branch_name: String,
    pub branch_location: Option<String>,
    pub employee_name: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub cash: CashSummary,
    pub items: Vec<ReportItem>,
    pub notes: Vec<String>,
}

#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
    organization: String,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>, organization: String) -> Self {
        Self { db, organization }
    }

    /// Assemble the report for a visit, or `NotFound` if the visit does not
    /// exist. Missing cash figures default to zero rather than failing.
    #[instrument(skip(self))]
    pub async fn build(&self, visit_id: i64) -> Result<VisitReport, ServiceError> {
        let visit = visit::Entity::find_by_id(visit_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("visit {visit_id} not found")))?;

        let branch = branch::Entity::find_by_id(visit.branch_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("branch {} not found", visit.branch_id))
            })?;

        let company_name = company::Entity::find_by_id(branch.company_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(|c| c.name)
            .unwrap_or_default();

        let employee_name = user::Entity::find_by_id(visit.employee_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(|u| u.full_name)
            .unwrap_or_else(|| "unknown".to_string());

        let cash = visit_cash::Entity::find()
            .filter(visit_cash::Column::VisitId.eq(visit_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(|c| CashSummary {
                system_balance: c.system_balance,
                actual_balance: c.actual_balance,
                sales_amount: c.sales_amount,
            })
            .unwrap_or_default();

        let items = visit_inventory_item::Entity::find()
            .filter(visit_inventory_item::Column::VisitId.eq(visit_id))
            .order_by_asc(visit_inventory_item::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|i| ReportItem {
                name: i.item_name,
                color: i.color,
                size: i.size,
                system_qty: i.system_qty,
                actual_qty: i.actual_qty,
            })
            .collect();

        let notes = visit_note::Entity::find()
            .filter(visit_note::Column::VisitId.eq(visit_id))
            .order_by_asc(visit_note::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|n| n.note_text)
            .collect();

        Ok(VisitReport {
            visit_id: visit.id,
            branch_id: visit.branch_id,
            organization: self.organization.clone(),
            company_name,
            branch_name: branch.name,
            branch_location: branch.location,
            employee_name,
            status: visit.status,
            started_at: visit.started_at,
            ended_at: visit.ended_at,
            cash,
            items,
            notes,
        })
    }
}

// A4 page geometry, millimetres.
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 15.0;
const TOP: f64 = PAGE_HEIGHT - MARGIN;
const BOTTOM: f64 = 20.0;
const LINE: f64 = 6.0;

fn mm(v: f64) -> Mm {
    Mm(v as _)
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ServiceError> {
        let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
        })
    }

    fn ensure_room(&mut self) {
        if self.y < BOTTOM {
            let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
    }

    fn title(&mut self, text: &str) {
        self.layer
            .use_text(text, 18.0, mm(MARGIN), mm(self.y), &self.bold);
        self.y -= LINE * 2.0;
    }

    fn heading(&mut self, text: &str) {
        self.ensure_room();
        self.y -= LINE * 0.5;
        self.layer
            .use_text(text, 13.0, mm(MARGIN), mm(self.y), &self.bold);
        self.y -= LINE;
    }

    fn line(&mut self, text: &str) {
        self.ensure_room();
        self.layer
            .use_text(text, 10.0, mm(MARGIN), mm(self.y), &self.regular);
        self.y -= LINE;
    }

    fn row(&mut self, cells: &[(f64, &str)], bold: bool) {
        self.ensure_room();
        let font = if bold { &self.bold } else { &self.regular };
        for (x, text) in cells {
            self.layer.use_text(*text, 10.0, mm(*x), mm(self.y), font);
        }
        self.y -= LINE;
    }

    fn finish(self) -> Result<Vec<u8>, ServiceError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ServiceError::ReportError(e.to_string()))
    }
}

fn fmt_money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn fmt_time(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

// Inventory table column x positions.
const COL_SEQ: f64 = MARGIN;
const COL_ITEM: f64 = 28.0;
const COL_COLOR: f64 = 85.0;
const COL_SIZE: f64 = 108.0;
const COL_SYSTEM: f64 = 130.0;
const COL_ACTUAL: f64 = 155.0;
const COL_DIFF: f64 = 180.0;

/// Render a report to PDF bytes. Pure: no I/O, no clock, no database.
pub fn render_pdf(report: &VisitReport) -> Result<Vec<u8>, ServiceError> {
    let mut page = PageWriter::new(&format!("Visit report #{}", report.visit_id))?;

    page.title(&format!("Field Visit Report #{}", report.visit_id));
    page.line(&report.organization);

    page.heading("Visit");
    page.line(&format!("Company: {}", report.company_name));
    let branch = match &report.branch_location {
        Some(location) => format!("Branch: {} ({location})", report.branch_name),
        None => format!("Branch: {}", report.branch_name),
    };
    page.line(&branch);
    page.line(&format!("Inspector: {}", report.employee_name));
    page.line(&format!("Status: {}", report.status));
    page.line(&format!("Started: {}", fmt_time(report.started_at)));
    if let Some(ended) = report.ended_at {
        page.line(&format!("Ended: {}", fmt_time(ended)));
    }

    page.heading("Cash");
    page.line(&format!(
        "System balance: {}",
        fmt_money(report.cash.system_balance)
    ));
    page.line(&format!(
        "Actual balance: {}",
        fmt_money(report.cash.actual_balance)
    ));
    page.line(&format!("Sales: {}", fmt_money(report.cash.sales_amount)));
    page.line(&format!(
        "Discrepancy: {}",
        fmt_money(report.cash.discrepancy())
    ));

    page.heading("Inventory");
    if report.items.is_empty() {
        page.line("No inventory recorded.");
    } else {
        page.row(
            &[
                (COL_SEQ, "#"),
                (COL_ITEM, "Item"),
                (COL_COLOR, "Color"),
                (COL_SIZE, "Size"),
                (COL_SYSTEM, "System"),
                (COL_ACTUAL, "Actual"),
                (COL_DIFF, "Diff"),
            ],
            true,
        );
        for (index, item) in report.items.iter().enumerate() {
            let seq = (index + 1).to_string();
            let system = item.system_qty.to_string();
            let actual = item.actual_qty.to_string();
            let diff = item.discrepancy().to_string();
            page.row(
                &[
                    (COL_SEQ, seq.as_str()),
                    (COL_ITEM, item.name.as_str()),
                    (COL_COLOR, item.color.as_deref().unwrap_or("-")),
                    (COL_SIZE, item.size.as_deref().unwrap_or("-")),
                    (COL_SYSTEM, system.as_str()),
                    (COL_ACTUAL, actual.as_str()),
                    (COL_DIFF, diff.as_str()),
                ],
                false,
            );
        }
    }

    if !report.notes.is_empty() {
        page.heading("Notes");
        for note in &report.notes {
            page.line(&format!("- {note}"));
        }
    }

    page.finish()
}
