use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use log::info;
use serde::Deserialize;
use std::sync::Arc;

use super::attestation::render_attestation_html;
use super::error::ReportsError;
use super::export::build_stats_workbook;
use super::stats::{year_stats, YearStats};
use crate::clients::ClientsService;
use crate::core::shared::state::AppState;
use crate::invoices::InvoicesService;
use crate::prestations::{Service, ServicesService};
use crate::urssaf::handlers::{build_summary, SummaryQuery};
use crate::urssaf::ActivityType;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub year: Option<i32>,
    pub activity_type: Option<ActivityType>,
}

impl StatsQuery {
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

pub fn year_range(year: i32) -> Result<(NaiveDate, NaiveDate), ReportsError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = year
        .checked_add(1)
        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
    start
        .zip(end)
        .ok_or_else(|| ReportsError::Validation(format!("year out of range: {year}")))
}

async fn load_year(state: &AppState, year: i32) -> Result<(YearStats, Vec<Service>), ReportsError> {
    let (start, end) = year_range(year)?;
    let services = ServicesService::new(state.conn.clone())
        .services_between(start, end)
        .await?;
    let invoices = InvoicesService::new(state.conn.clone(), state.config.company.clone())
        .issued_between(start, end)
        .await?;
    let clients_count = ClientsService::new(state.conn.clone()).count_clients().await?;

    let stats = year_stats(
        year,
        &services,
        &invoices,
        clients_count,
        Utc::now().date_naive(),
    );
    Ok((stats, services))
}

pub async fn handle_year_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<YearStats>, ReportsError> {
    tracing::debug!("Computing statistics for {}", query.year());
    let (stats, _) = load_year(&state, query.year()).await?;
    Ok(Json(stats))
}

pub async fn handle_stats_xlsx(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ReportsError> {
    let year = query.year();
    let activity = query
        .activity_type
        .unwrap_or(state.config.company.default_activity_type);

    let (stats, services) = load_year(&state, year).await?;
    let names = ClientsService::new(state.conn.clone()).client_names().await?;
    let bytes = build_stats_workbook(&stats, activity, &services, &names)?;

    info!("Exported {year} statistics workbook ({} bytes)", bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"proflow-stats-{year}.xlsx\""),
            ),
        ],
        bytes,
    ))
}

pub async fn handle_attestation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ReportsError> {
    tracing::debug!("Rendering attestation: {:?}", query);
    let summary = build_summary(&state, &query).await?;
    let html = render_attestation_html(&summary, &state.config.company, Utc::now().date_naive());
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}
