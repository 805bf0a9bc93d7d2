use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::InvoicesError;
use crate::prestations::Service;
use crate::urssaf::{compute_contributions, ActivityType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub urssaf_rate: f64,
    pub urssaf_deduction: f64,
    pub net_amount: f64,
}

/// Subtotal of the services, then the URSSAF share of the activity.
pub fn compute_totals(services: &[Service], activity: ActivityType) -> InvoiceTotals {
    let subtotal: f64 = services.iter().map(Service::amount).sum();
    let result = compute_contributions(subtotal, activity);
    InvoiceTotals {
        subtotal,
        urssaf_rate: result.rate,
        urssaf_deduction: result.contributions,
        net_amount: result.net_revenue,
    }
}

/// `{prefix}-{YYYY}{MM}-{seq:05}`
pub fn format_invoice_number(prefix: &str, issue_date: NaiveDate, sequence: i64) -> String {
    format!(
        "{}-{:04}{:02}-{:05}",
        prefix,
        issue_date.year(),
        issue_date.month(),
        sequence
    )
}

pub fn default_due_date(issue_date: NaiveDate, due_days: i64) -> Result<NaiveDate, InvoicesError> {
    u64::try_from(due_days)
        .ok()
        .and_then(|days| issue_date.checked_add_days(Days::new(days)))
        .ok_or_else(|| {
            InvoicesError::Validation(format!(
                "due date out of range: {issue_date} + {due_days} days"
            ))
        })
}
