//! Services ("prestations") performed for clients.
//!
//! `hours` holds the billed quantity whatever the pricing type; for daily
//! pricing it is the inclusive day count of the date range.

pub mod error;
pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::ServicesError;
pub use handlers::*;
pub use service::ServicesService;
pub use types::*;

pub fn configure_services_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::SERVICES,
            get(handle_list_services).post(handle_create_service),
        )
        .route(ApiUrls::SERVICES_BULK_STATUS, post(handle_bulk_status))
        .route(ApiUrls::SERVICES_DAILY_QUANTITY, get(handle_daily_quantity))
        .route(
            ApiUrls::SERVICE_BY_ID,
            get(handle_get_service)
                .put(handle_update_service)
                .delete(handle_delete_service),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(hours: f64, rate: f64, pricing: Option<&str>) -> ServiceRow {
        ServiceRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            date: d(2025, 3, 1),
            hours,
            hourly_rate: rate,
            description: "Audit".to_string(),
            status: "completed".to_string(),
            pricing_type: pricing.map(str::to_string),
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_daily_quantity_inclusive() {
        assert_eq!(daily_quantity(d(2025, 3, 1), d(2025, 3, 5)), 5);
        assert_eq!(daily_quantity(d(2025, 3, 1), d(2025, 3, 1)), 1);
        assert_eq!(daily_quantity(d(2024, 2, 28), d(2024, 3, 1)), 3);
    }

    #[test]
    fn test_daily_quantity_never_below_one() {
        assert_eq!(daily_quantity(d(2025, 3, 5), d(2025, 3, 1)), 1);
    }

    #[test]
    fn test_daily_quantity_monotonic_in_end_date() {
        let start = d(2025, 1, 10);
        let mut previous = 0;
        for offset in -5..60 {
            let end = start + chrono::Duration::days(offset);
            let days = daily_quantity(start, end);
            assert!(days >= 1);
            assert!(days >= previous);
            previous = days;
        }
    }

    #[test]
    fn test_resolve_quantity_daily_ignores_hours() {
        let q = resolve_quantity(
            Some(PricingType::Daily),
            Some(42.0),
            Some(d(2025, 3, 1)),
            Some(d(2025, 3, 5)),
        )
        .unwrap();
        assert_eq!(q, 5.0);
    }

    #[test]
    fn test_resolve_quantity_rejects_reversed_range() {
        let err = resolve_quantity(
            Some(PricingType::Daily),
            None,
            Some(d(2025, 3, 5)),
            Some(d(2025, 3, 1)),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: end date must not precede start date"
        );
    }

    #[test]
    fn test_resolve_quantity_requirements() {
        assert!(resolve_quantity(Some(PricingType::Daily), None, Some(d(2025, 3, 1)), None).is_err());
        assert!(resolve_quantity(None, None, None, None).is_err());
        assert_eq!(resolve_quantity(Some(PricingType::Hourly), Some(3.5), None, None).unwrap(), 3.5);
        assert_eq!(resolve_quantity(Some(PricingType::Project), None, None, None).unwrap(), 1.0);
    }

    #[test]
    fn test_amount_and_suffix() {
        let service = Service::from(row(5.0, 450.0, Some("daily")));
        assert_eq!(service.amount, 2250.0);
        assert_eq!(service.amount(), 2250.0);
        assert_eq!(service.quantity_label(), "5 j");

        let hourly = Service::from(row(2.5, 60.0, None));
        assert_eq!(hourly.unit_suffix, "h");
        assert_eq!(hourly.status, ServiceStatus::Completed);

        let project = Service::from(row(1.0, 3000.0, Some("project")));
        assert_eq!(project.unit_suffix, "forfait");
        assert_eq!(project.pricing_type, Some(PricingType::Project));

        let unknown = Service::from(row(3.0, 10.0, Some("weekly")));
        assert_eq!(unknown.pricing_type, None);
        assert_eq!(unknown.unit_suffix, "h");
    }

    #[test]
    fn test_update_request_amount_detection() {
        let description_only = UpdateServiceRequest {
            description: Some("Nouveau libellé".to_string()),
            ..Default::default()
        };
        assert!(!description_only.changes_amount());

        let rate_change = UpdateServiceRequest {
            hourly_rate: Some(80.0),
            ..Default::default()
        };
        assert!(rate_change.changes_amount());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amounts(0.0, 0.0).is_ok());
        assert!(validate_amounts(-1.0, 10.0).is_err());
        assert!(validate_amounts(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_status_round_trip_through_text() {
        for status in [ServiceStatus::Pending, ServiceStatus::Completed, ServiceStatus::Invoiced] {
            assert_eq!(status.to_string().parse::<ServiceStatus>().unwrap(), status);
        }
        assert!("done".parse::<ServiceStatus>().is_err());
    }
}
