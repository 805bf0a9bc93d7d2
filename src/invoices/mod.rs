//! Invoices built from a client's services.
//!
//! Creating an invoice marks its services `invoiced`; deleting a draft
//! releases them back to `completed`.

pub mod error;
pub mod handlers;
pub mod html;
pub mod service;
pub mod totals;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::InvoicesError;
pub use handlers::*;
pub use service::{InvoiceDocument, InvoicesService};
pub use totals::*;
pub use types::*;

pub fn configure_invoices_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::INVOICES,
            get(handle_list_invoices).post(handle_create_invoice),
        )
        .route(ApiUrls::INVOICE_STATS, get(handle_invoice_stats))
        .route(
            ApiUrls::INVOICE_BY_ID,
            get(handle_get_invoice)
                .put(handle_update_invoice)
                .delete(handle_delete_invoice),
        )
        .route(ApiUrls::INVOICE_SEND, post(handle_send_invoice))
        .route(ApiUrls::INVOICE_PAY, post(handle_pay_invoice))
        .route(ApiUrls::INVOICE_RECALCULATE, post(handle_recalculate_invoice))
        .route(ApiUrls::INVOICE_HTML, get(handle_invoice_html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::Client;
    use crate::core::config::CompanyConfig;
    use crate::prestations::{Service, ServiceRow};
    use crate::urssaf::ActivityType;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn make_service(client_id: Uuid, hours: f64, rate: f64, status: &str) -> Service {
        Service::from(ServiceRow {
            id: Uuid::new_v4(),
            client_id,
            date: d(2025, 3, 10),
            hours,
            hourly_rate: rate,
            description: "Développement <API>".to_string(),
            status: status.to_string(),
            pricing_type: Some("hourly".to_string()),
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    fn invoice(status: InvoiceStatus, subtotal: f64, due: NaiveDate) -> Invoice {
        let totals = InvoiceTotals {
            subtotal,
            urssaf_rate: 0.212,
            urssaf_deduction: subtotal * 0.212,
            net_amount: subtotal * 0.788,
        };
        Invoice {
            id: Uuid::new_v4(),
            number: "FAC-202503-00001".to_string(),
            client_id: Uuid::new_v4(),
            activity_type: ActivityType::Services,
            service_ids: vec![],
            subtotal: totals.subtotal,
            urssaf_rate: totals.urssaf_rate,
            urssaf_deduction: totals.urssaf_deduction,
            net_amount: totals.net_amount,
            status,
            issue_date: d(2025, 3, 1),
            due_date: due,
            notes: None,
            sent_at: None,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_compute_totals() {
        let client_id = Uuid::new_v4();
        let services = vec![
            make_service(client_id, 10.0, 60.0, "completed"),
            make_service(client_id, 4.0, 100.0, "completed"),
        ];
        let totals = compute_totals(&services, ActivityType::Services);
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(format!("{:.2}", totals.urssaf_deduction), "212.00");
        assert_eq!(format!("{:.2}", totals.net_amount), "788.00");
        assert!((totals.subtotal - totals.urssaf_deduction - totals.net_amount).abs() < 1e-9);
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number("FAC", d(2025, 3, 14), 7), "FAC-202503-00007");
        assert_eq!(format_invoice_number("PF", d(2024, 12, 1), 123456), "PF-202412-123456");
    }

    #[test]
    fn test_default_due_date() {
        assert_eq!(default_due_date(d(2025, 1, 15), 30).unwrap(), d(2025, 2, 14));
        assert_eq!(default_due_date(d(2025, 1, 15), 0).unwrap(), d(2025, 1, 15));
    }

    #[test]
    fn test_default_due_date_out_of_range() {
        assert!(matches!(
            default_due_date(d(2025, 1, 15), i64::MAX),
            Err(InvoicesError::Validation(_))
        ));
        assert!(default_due_date(NaiveDate::MAX, 1).is_err());
        assert!(default_due_date(d(2025, 1, 15), -1).is_err());
    }

    #[test]
    fn test_concurrently_invoiced_services_conflict() {
        assert!(service::ensure_all_marked(3, 3).is_ok());
        assert!(matches!(
            service::ensure_all_marked(2, 3),
            Err(InvoicesError::Conflict(msg)) if msg.starts_with("1 of 3")
        ));
        assert!(service::ensure_all_marked(0, 1).is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(InvoiceStatus::Draft.transition(InvoiceStatus::Sent).unwrap(), InvoiceStatus::Sent);
        assert_eq!(InvoiceStatus::Sent.transition(InvoiceStatus::Paid).unwrap(), InvoiceStatus::Paid);
        assert!(InvoiceStatus::Draft.transition(InvoiceStatus::Paid).is_err());
        assert!(InvoiceStatus::Paid.transition(InvoiceStatus::Sent).is_err());
        assert!(InvoiceStatus::Sent.transition(InvoiceStatus::Draft).is_err());
    }

    #[test]
    fn test_check_invoiceable() {
        let client_id = Uuid::new_v4();
        let ok = make_service(client_id, 1.0, 10.0, "completed");
        assert!(service::check_invoiceable(&[ok.clone()], &[ok.id], client_id).is_ok());

        let missing = Uuid::new_v4();
        assert!(matches!(
            service::check_invoiceable(&[ok.clone()], &[ok.id, missing], client_id),
            Err(InvoicesError::Validation(_))
        ));

        let foreign = make_service(Uuid::new_v4(), 1.0, 10.0, "completed");
        assert!(matches!(
            service::check_invoiceable(&[foreign.clone()], &[foreign.id], client_id),
            Err(InvoicesError::Validation(_))
        ));

        let invoiced = make_service(client_id, 1.0, 10.0, "invoiced");
        assert!(matches!(
            service::check_invoiceable(&[invoiced.clone()], &[invoiced.id], client_id),
            Err(InvoicesError::Conflict(_))
        ));
    }

    #[test]
    fn test_invoice_stats() {
        let today = d(2025, 5, 1);
        let invoices = vec![
            invoice(InvoiceStatus::Draft, 100.0, d(2025, 6, 1)),
            invoice(InvoiceStatus::Sent, 200.0, d(2025, 4, 1)),
            invoice(InvoiceStatus::Sent, 300.0, d(2025, 6, 1)),
            invoice(InvoiceStatus::Paid, 400.0, d(2025, 3, 1)),
        ];
        let stats = invoice_stats(&invoices, today);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.outstanding_amount, 500.0);
        assert_eq!(stats.paid_amount, 400.0);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.by_status[1].count, 2);
        assert_eq!(stats.by_status[0].status, InvoiceStatus::Draft);
    }

    #[test]
    fn test_render_html_escapes_and_totals() {
        let client_id = Uuid::new_v4();
        let services = vec![make_service(client_id, 10.0, 100.0, "invoiced")];
        let mut inv = invoice(InvoiceStatus::Draft, 1000.0, d(2025, 3, 31));
        inv.client_id = client_id;
        inv.notes = Some("Merci & à bientôt".to_string());
        let doc = InvoiceDocument {
            invoice: inv,
            client: Client {
                id: client_id,
                name: "Léa Dubois".to_string(),
                email: None,
                phone: None,
                company: None,
                address_line1: None,
                postal_code: Some("75011".to_string()),
                city: Some("Paris".to_string()),
                country: None,
                siret: None,
                notes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            services,
        };

        let html = html::render_invoice_html(&doc, &CompanyConfig::default());
        assert!(html.contains("Facture FAC-202503-00001"));
        assert!(html.contains("Développement &lt;API&gt;"));
        assert!(html.contains("1000.00 €"));
        assert!(html.contains("212.00 €"));
        assert!(html.contains("788.00 €"));
        assert!(html.contains("75011 Paris"));
        assert!(html.contains("Merci &amp; à bientôt"));
        assert!(html.contains("10 h"));
        assert!(html.contains("Brouillon"));
    }
}
