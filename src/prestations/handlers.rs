use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ServicesError;
use super::service::ServicesService;
use super::types::*;
use crate::core::shared::state::AppState;

pub async fn handle_list_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Vec<Service>>, ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    Ok(Json(service.list_services(query).await?))
}

pub async fn handle_create_service(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    let created = service.create_service(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    Ok(Json(service.get_service(id).await?))
}

pub async fn handle_update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    Ok(Json(service.update_service(id, request).await?))
}

pub async fn handle_delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    service.delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_bulk_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkStatusRequest>,
) -> Result<Json<BulkStatusResponse>, ServicesError> {
    let service = ServicesService::new(state.conn.clone());
    Ok(Json(service.bulk_update_status(request).await?))
}

/// Day count preview for the daily pricing form.
pub async fn handle_daily_quantity(
    Query(query): Query<DailyQuantityQuery>,
) -> Result<Json<DailyQuantityResponse>, ServicesError> {
    validate_date_range(query.start_date, query.end_date)?;
    Ok(Json(DailyQuantityResponse {
        start_date: query.start_date,
        end_date: query.end_date,
        days: daily_quantity(query.start_date, query.end_date),
    }))
}
