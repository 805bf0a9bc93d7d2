use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::InvoicesError;
use super::html::render_invoice_html;
use super::service::InvoicesService;
use super::types::*;
use crate::core::shared::state::AppState;

fn invoices_service(state: &AppState) -> InvoicesService {
    InvoicesService::new(state.conn.clone(), state.config.company.clone())
}

pub async fn handle_list_invoices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<Invoice>>, InvoicesError> {
    Ok(Json(invoices_service(&state).list_invoices(query).await?))
}

pub async fn handle_create_invoice(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Invoice>), InvoicesError> {
    let invoice = invoices_service(&state).create_invoice(request).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn handle_get_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, InvoicesError> {
    Ok(Json(invoices_service(&state).get_invoice(id).await?))
}

pub async fn handle_update_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, InvoicesError> {
    Ok(Json(invoices_service(&state).update_invoice(id, request).await?))
}

pub async fn handle_delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, InvoicesError> {
    invoices_service(&state).delete_invoice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_send_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, InvoicesError> {
    Ok(Json(invoices_service(&state).send_invoice(id).await?))
}

pub async fn handle_pay_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, InvoicesError> {
    Ok(Json(invoices_service(&state).mark_as_paid(id).await?))
}

pub async fn handle_recalculate_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, InvoicesError> {
    Ok(Json(invoices_service(&state).recalculate(id).await?))
}

pub async fn handle_invoice_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InvoiceStats>, InvoicesError> {
    Ok(Json(invoices_service(&state).stats().await?))
}

pub async fn handle_invoice_html(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, InvoicesError> {
    let doc = invoices_service(&state).document(id).await?;
    let html = render_invoice_html(&doc, &state.config.company);
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}
