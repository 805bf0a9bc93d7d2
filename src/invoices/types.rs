use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::InvoicesError;
use super::totals::InvoiceTotals;
use crate::core::shared::schema::invoices;
use crate::urssaf::ActivityType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [Self::Draft, Self::Sent, Self::Paid];

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Brouillon",
            Self::Sent => "Envoyée",
            Self::Paid => "Payée",
        }
    }

    /// Only forward moves along draft → sent → paid are allowed.
    pub fn transition(self, target: InvoiceStatus) -> Result<InvoiceStatus, InvoicesError> {
        match (self, target) {
            (Self::Draft, Self::Sent) | (Self::Sent, Self::Paid) => Ok(target),
            (from, to) => Err(InvoicesError::InvalidStatus(format!(
                "cannot move invoice from {from} to {to}"
            ))),
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = InvoicesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            other => Err(InvoicesError::Validation(format!(
                "unknown invoice status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub activity_type: String,
    pub service_ids: Vec<Uuid>,
    pub subtotal: f64,
    pub urssaf_rate: f64,
    pub urssaf_deduction: f64,
    pub net_amount: f64,
    pub status: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub activity_type: ActivityType,
    pub service_ids: Vec<Uuid>,
    pub subtotal: f64,
    pub urssaf_rate: f64,
    pub urssaf_deduction: f64,
    pub net_amount: f64,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            number: row.number,
            client_id: row.client_id,
            activity_type: row.activity_type.parse().unwrap_or_default(),
            service_ids: row.service_ids,
            subtotal: row.subtotal,
            urssaf_rate: row.urssaf_rate,
            urssaf_deduction: row.urssaf_deduction,
            net_amount: row.net_amount,
            status: row.status.parse().unwrap_or_default(),
            issue_date: row.issue_date,
            due_date: row.due_date,
            notes: row.notes,
            sent_at: row.sent_at,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            urssaf_rate: self.urssaf_rate,
            urssaf_deduction: self.urssaf_deduction,
            net_amount: self.net_amount,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && today > self.due_date
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub service_ids: Vec<Uuid>,
    pub activity_type: Option<ActivityType>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Editable fields of a draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub activity_type: Option<ActivityType>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceListQuery {
    pub client_id: Option<Uuid>,
    pub status: Option<InvoiceStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub status: InvoiceStatus,
    pub count: usize,
    pub subtotal: f64,
    pub net_amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceStats {
    pub total_count: usize,
    pub by_status: Vec<StatusTotals>,
    pub outstanding_amount: f64,
    pub overdue_count: usize,
    pub paid_amount: f64,
}

pub fn invoice_stats(invoices: &[Invoice], today: NaiveDate) -> InvoiceStats {
    let by_status: Vec<StatusTotals> = InvoiceStatus::ALL
        .iter()
        .map(|&status| {
            invoices
                .iter()
                .filter(|i| i.status == status)
                .fold(
                    StatusTotals {
                        status,
                        ..Default::default()
                    },
                    |mut acc, i| {
                        acc.count += 1;
                        acc.subtotal += i.subtotal;
                        acc.net_amount += i.net_amount;
                        acc
                    },
                )
        })
        .collect();

    let subtotal_of = |status: InvoiceStatus| {
        by_status
            .iter()
            .find(|t| t.status == status)
            .map(|t| t.subtotal)
            .unwrap_or(0.0)
    };

    InvoiceStats {
        total_count: invoices.len(),
        outstanding_amount: subtotal_of(InvoiceStatus::Sent),
        paid_amount: subtotal_of(InvoiceStatus::Paid),
        overdue_count: invoices.iter().filter(|i| i.is_overdue(today)).count(),
        by_status,
    }
}
