use axum::{response::IntoResponse, Json};

use crate::clients::ClientsError;
use crate::invoices::InvoicesError;
use crate::prestations::ServicesError;
use crate::urssaf::UrssafError;

#[derive(Debug, thiserror::Error)]
pub enum ReportsError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Services(#[from] ServicesError),
    #[error(transparent)]
    Invoices(#[from] InvoicesError),
    #[error(transparent)]
    Clients(#[from] ClientsError),
    #[error(transparent)]
    Urssaf(#[from] UrssafError),
}

impl IntoResponse for ReportsError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        match self {
            Self::Services(e) => e.into_response(),
            Self::Invoices(e) => e.into_response(),
            Self::Clients(e) => e.into_response(),
            Self::Urssaf(e) => e.into_response(),
            other => {
                let status = if matches!(other, Self::Validation(_)) {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, Json(serde_json::json!({ "error": other.to_string() }))).into_response()
            }
        }
    }
}
