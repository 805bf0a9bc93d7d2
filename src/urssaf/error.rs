use axum::{response::IntoResponse, Json};

#[derive(Debug, thiserror::Error)]
pub enum UrssafError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),
    #[error("Invalid quarter: {0} (expected 1-4)")]
    InvalidQuarter(u32),
    #[error("Unknown activity type: {0}")]
    UnknownActivity(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl IntoResponse for UrssafError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let status = match &self {
            Self::InvalidMonth(_)
            | Self::InvalidQuarter(_)
            | Self::UnknownActivity(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
