pub mod error;
pub mod handlers;
pub mod service;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::ClientsError;
pub use handlers::*;
pub use service::ClientsService;
pub use types::*;

pub fn configure_clients_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::CLIENTS,
            get(handle_list_clients).post(handle_create_client),
        )
        .route(
            ApiUrls::CLIENT_BY_ID,
            get(handle_get_client)
                .put(handle_update_client)
                .delete(handle_delete_client),
        )
        .route(ApiUrls::CLIENT_SUMMARY, get(handle_client_summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prestations::{ServiceRow, Service};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Camille Martin".to_string(),
            email: Some("camille@example.fr".to_string()),
            phone: None,
            company: Some("Atelier Martin".to_string()),
            address_line1: Some("12 rue des Lilas".to_string()),
            postal_code: Some("69003".to_string()),
            city: Some("Lyon".to_string()),
            country: None,
            siret: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(hours: f64, rate: f64, status: &str) -> Service {
        Service::from(ServiceRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            hours,
            hourly_rate: rate,
            description: "Conseil".to_string(),
            status: status.to_string(),
            pricing_type: None,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_revenue_totals() {
        let services = vec![
            service(2.0, 50.0, "invoiced"),
            service(1.5, 80.0, "completed"),
            service(4.0, 25.0, "pending"),
        ];
        let totals = revenue_totals(&services);
        assert_eq!(totals.services_count, 3);
        assert_eq!(totals.total_amount, 320.0);
        assert_eq!(totals.invoiced_amount, 100.0);
        assert_eq!(totals.uninvoiced_amount, 220.0);
    }

    #[test]
    fn test_revenue_totals_empty() {
        assert_eq!(revenue_totals(&[]), RevenueTotals::default());
    }

    #[test]
    fn test_display_name_and_address() {
        let c = client();
        assert_eq!(c.display_name(), "Atelier Martin");
        assert_eq!(c.address_lines(), vec!["12 rue des Lilas", "69003 Lyon"]);

        let individual = Client { company: Some(String::new()), ..client() };
        assert_eq!(individual.display_name(), "Camille Martin");
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("")).is_ok());
        assert!(validate_email(Some("a@b.fr")).is_ok());
        assert!(matches!(validate_email(Some("nobody")), Err(ClientsError::Validation(_))));
        assert!(validate_email(Some("@b.fr")).is_err());
    }

    #[test]
    fn test_siret_validation() {
        assert!(validate_siret(Some("732 829 320 00074")).is_ok());
        assert!(validate_siret(Some("12345")).is_err());
        assert!(validate_siret(Some("7328293200007A")).is_err());
        assert_eq!(
            normalize_siret(Some("732 829 320 00074".to_string())),
            Some("73282932000074".to_string())
        );
        assert_eq!(normalize_siret(Some("  ".to_string())), None);
    }

    #[test]
    fn test_summary_flattens_totals() {
        let summary = ClientSummary {
            client: client(),
            totals: revenue_totals(&[service(1.0, 100.0, "invoiced")]),
            invoices_count: 1,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["services_count"], 1);
        assert_eq!(json["invoiced_amount"], 100.0);
        assert_eq!(json["client"]["name"], "Camille Martin");
    }
}
