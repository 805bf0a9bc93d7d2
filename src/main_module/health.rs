//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::core::config::CompanyConfig;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::pending_migrations;
use crate::urssaf::ActivityType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub company: String,
    pub default_activity_type: ActivityType,
    pub database: bool,
    pub pending_migrations: Vec<String>,
}

impl HealthReport {
    /// `pending` is `None` when the database could not be inspected.
    pub fn new(company: &CompanyConfig, pending: Option<Vec<String>>) -> Self {
        let database = pending.is_some();
        let pending_migrations = pending.unwrap_or_default();
        let status = match (database, pending_migrations.is_empty()) {
            (false, _) => "unavailable",
            (true, false) => "degraded",
            (true, true) => "healthy",
        };
        Self {
            status,
            service: "proflow",
            version: env!("CARGO_PKG_VERSION"),
            company: company.name.clone(),
            default_activity_type: company.default_activity_type,
            database,
            pending_migrations,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.status == "healthy" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Database reachability and schema state.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let pending = match state.conn.get() {
        Ok(mut conn) => pending_migrations(&mut conn)
            .map_err(|e| warn!("Health check could not list migrations: {e}"))
            .ok(),
        Err(e) => {
            warn!("Health check could not reach the database: {e}");
            None
        }
    };

    let report = HealthReport::new(&state.config.company, pending);
    if !report.pending_migrations.is_empty() {
        warn!(
            "{} migration(s) pending: {}",
            report.pending_migrations.len(),
            report.pending_migrations.join(", ")
        );
    }
    (report.status_code(), Json(report))
}

pub async fn health_check_simple() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "proflow",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> CompanyConfig {
        CompanyConfig {
            name: "Atelier Martin".to_string(),
            default_activity_type: ActivityType::Liberale,
            ..CompanyConfig::default()
        }
    }

    #[test]
    fn test_healthy_when_schema_current() {
        let report = HealthReport::new(&company(), Some(vec![]));
        assert_eq!(report.status, "healthy");
        assert_eq!(report.status_code(), StatusCode::OK);
        assert!(report.database);
        assert_eq!(report.company, "Atelier Martin");
        assert_eq!(report.default_activity_type, ActivityType::Liberale);
    }

    #[test]
    fn test_pending_migrations_degrade() {
        let pending = vec!["2025-01-01-000000_create_invoices".to_string()];
        let report = HealthReport::new(&company(), Some(pending.clone()));
        assert_eq!(report.status, "degraded");
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.pending_migrations, pending);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pending_migrations"][0], "2025-01-01-000000_create_invoices");
        assert_eq!(json["default_activity_type"], "liberale");
    }

    #[test]
    fn test_unreachable_database() {
        let report = HealthReport::new(&company(), None);
        assert_eq!(report.status, "unavailable");
        assert!(!report.database);
        assert!(report.pending_migrations.is_empty());
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
