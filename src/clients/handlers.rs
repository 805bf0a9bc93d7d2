use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ClientsError;
use super::service::ClientsService;
use super::types::*;
use crate::core::shared::state::AppState;

pub async fn handle_list_clients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ClientListResponse>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.list_clients(query).await?))
}

pub async fn handle_create_client(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    let client = service.create_client(request).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn handle_get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.get_client(id).await?))
}

pub async fn handle_update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<Client>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.update_client(id, request).await?))
}

pub async fn handle_delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    service.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_client_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientSummary>, ClientsError> {
    let service = ClientsService::new(state.conn.clone());
    Ok(Json(service.client_summary(id).await?))
}
