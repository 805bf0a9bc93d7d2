use serde::{Deserialize, Serialize};

use crate::invoices::{invoice_stats, Invoice, InvoiceStats};
use crate::prestations::{Service, ServiceStatus};
use crate::urssaf::{compute_contributions, period::month_label, monthly_revenue, ActivityType, MonthRevenue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatusTotals {
    pub status: ServiceStatus,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub year: i32,
    pub revenue_total: f64,
    pub clients_count: i64,
    pub services_count: usize,
    pub services_by_status: Vec<ServiceStatusTotals>,
    pub invoices: InvoiceStats,
    pub monthly: Vec<MonthRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyContribution {
    pub month: u32,
    pub label: String,
    pub revenue: f64,
    pub contributions: f64,
    pub net_revenue: f64,
}

pub fn monthly_series(services: &[Service], year: i32) -> Vec<MonthRevenue> {
    (1..=12)
        .map(|month| MonthRevenue {
            year,
            month,
            label: month_label(year, month),
            revenue: monthly_revenue(services, year, month),
        })
        .collect()
}

/// `services` and `invoices` are expected to be restricted to `year` already.
pub fn year_stats(
    year: i32,
    services: &[Service],
    invoices: &[Invoice],
    clients_count: i64,
    today: chrono::NaiveDate,
) -> YearStats {
    let services_by_status = [
        ServiceStatus::Pending,
        ServiceStatus::Completed,
        ServiceStatus::Invoiced,
    ]
    .into_iter()
    .map(|status| {
        let matching = services.iter().filter(|s| s.status == status);
        ServiceStatusTotals {
            status,
            count: matching.clone().count(),
            amount: matching.map(Service::amount).sum(),
        }
    })
    .collect();

    let monthly = monthly_series(services, year);

    YearStats {
        year,
        revenue_total: monthly.iter().map(|m| m.revenue).sum(),
        clients_count,
        services_count: services.len(),
        services_by_status,
        invoices: invoice_stats(invoices, today),
        monthly,
    }
}

pub fn monthly_contributions(
    monthly: &[MonthRevenue],
    activity: ActivityType,
) -> Vec<MonthlyContribution> {
    monthly
        .iter()
        .map(|m| {
            let result = compute_contributions(m.revenue, activity);
            MonthlyContribution {
                month: m.month,
                label: m.label.clone(),
                revenue: result.revenue,
                contributions: result.contributions,
                net_revenue: result.net_revenue,
            }
        })
        .collect()
}
