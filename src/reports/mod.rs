//! Yearly dashboard figures, the XLSX export and the revenue attestation.

pub mod attestation;
pub mod error;
pub mod export;
pub mod handlers;
pub mod stats;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::ReportsError;
pub use handlers::*;
pub use stats::*;

pub fn configure_reports_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::REPORTS_STATS, get(handle_year_stats))
        .route(ApiUrls::REPORTS_STATS_XLSX, get(handle_stats_xlsx))
        .route(ApiUrls::REPORTS_ATTESTATION, get(handle_attestation))
}

#[cfg(test)]
mod tests {
    use super::attestation::render_attestation_html;
    use super::export::build_stats_workbook;
    use super::*;
    use crate::core::config::CompanyConfig;
    use crate::invoices::{Invoice, InvoiceStatus};
    use crate::prestations::{PricingType, Service, ServiceStatus};
    use crate::urssaf::handlers::{RevenueSource, UrssafSummary};
    use crate::urssaf::{compute_contributions, ActivityType, MonthRevenue, Period};
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_service(client_id: Uuid, on: NaiveDate, hours: f64, rate: f64, status: ServiceStatus) -> Service {
        Service {
            id: Uuid::new_v4(),
            client_id,
            date: on,
            hours,
            hourly_rate: rate,
            amount: hours * rate,
            description: "Développement".to_string(),
            status,
            pricing_type: Some(PricingType::Hourly),
            unit_suffix: "h".to_string(),
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_year_stats_totals() {
        let client = Uuid::new_v4();
        let services = vec![
            make_service(client, date(2025, 1, 10), 10.0, 50.0, ServiceStatus::Invoiced),
            make_service(client, date(2025, 3, 2), 5.0, 100.0, ServiceStatus::Completed),
            make_service(client, date(2025, 3, 20), 2.0, 100.0, ServiceStatus::Pending),
        ];

        let stats = year_stats(2025, &services, &[], 4, date(2025, 6, 1));

        assert_eq!(stats.revenue_total, 1200.0);
        assert_eq!(stats.services_count, 3);
        assert_eq!(stats.clients_count, 4);
        assert_eq!(stats.monthly.len(), 12);
        assert_eq!(stats.monthly[0].revenue, 500.0);
        assert_eq!(stats.monthly[2].revenue, 700.0);
        assert_eq!(stats.monthly[2].label, "mars 2025");
        assert_eq!(stats.monthly[11].revenue, 0.0);

        let invoiced = &stats.services_by_status[2];
        assert_eq!(invoiced.status, ServiceStatus::Invoiced);
        assert_eq!(invoiced.count, 1);
        assert_eq!(invoiced.amount, 500.0);
        assert_eq!(stats.invoices.total_count, 0);
    }

    #[test]
    fn test_monthly_contributions_follow_rate() {
        let monthly = vec![MonthRevenue {
            year: 2025,
            month: 1,
            label: "janvier 2025".to_string(),
            revenue: 1000.0,
        }];
        let rows = monthly_contributions(&monthly, ActivityType::Services);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].contributions - 212.0).abs() < 1e-9);
        assert!((rows[0].net_revenue - 788.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_range() {
        let (start, end) = year_range(2024).unwrap();
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2025, 1, 1));
        assert!(year_range(300_000).is_err());
        assert!(matches!(year_range(i32::MAX), Err(ReportsError::Validation(_))));
    }

    #[test]
    fn test_stats_workbook_is_xlsx() {
        let client = Uuid::new_v4();
        let services = vec![make_service(client, date(2025, 2, 3), 3.0, 80.0, ServiceStatus::Completed)];
        let stats = year_stats(2025, &services, &[], 1, date(2025, 6, 1));
        let names = HashMap::from([(client, "Acme".to_string())]);

        let bytes = build_stats_workbook(&stats, ActivityType::Services, &services, &names).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_year_stats_counts_overdue_invoices() {
        let client = Uuid::new_v4();
        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            number: "FAC-202501-00001".to_string(),
            client_id: client,
            service_ids: vec![],
            activity_type: ActivityType::Services,
            status: InvoiceStatus::Sent,
            subtotal: 1000.0,
            urssaf_rate: 0.212,
            urssaf_deduction: 212.0,
            net_amount: 788.0,
            issue_date: date(2025, 1, 5),
            due_date: date(2025, 2, 4),
            notes: None,
            sent_at: Some(now),
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        let stats = year_stats(2025, &[], &[invoice], 1, date(2025, 3, 1));
        assert_eq!(stats.invoices.total_count, 1);
        assert_eq!(stats.invoices.overdue_count, 1);
    }

    #[test]
    fn test_attestation_html() {
        let summary = UrssafSummary {
            period: Period::quarter(2025, 1).unwrap(),
            label: "T1 2025".to_string(),
            activity_type: ActivityType::Services,
            activity_label: ActivityType::Services.label().to_string(),
            revenue_source: RevenueSource::Override,
            months: vec![],
            result: compute_contributions(1500.0, ActivityType::Services),
        };
        let company = CompanyConfig {
            name: "Dupont & Fils".to_string(),
            ..CompanyConfig::default()
        };

        let html = render_attestation_html(&summary, &company, date(2025, 4, 2));
        assert!(html.contains("T1 2025"));
        assert!(html.contains("Dupont &amp; Fils"));
        assert!(html.contains("1500.00 €"));
        assert!(html.contains("318.00 €"));
        assert!(html.contains("02/04/2025"));
        assert!(html.contains("déclaré manuellement"));
    }
}
