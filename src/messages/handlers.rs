use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::MessagesError;
use super::service::MessagesService;
use super::types::*;
use crate::core::shared::auth::CurrentUser;
use crate::core::shared::state::AppState;

pub async fn handle_list_messages(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<MessageListResponse>, MessagesError> {
    tracing::debug!("Listing messages: user={}, folder={:?}", user.id, query.folder);
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.list_messages(user.id, query).await?))
}

pub async fn handle_compose_message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<ComposeMessageRequest>,
) -> Result<(StatusCode, Json<Message>), MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    let message = service.compose(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn handle_message_counts(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<MessageCounts>, MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.counts(user.id).await?))
}

pub async fn handle_users_emails(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Json(request): Json<UsersEmailsRequest>,
) -> Result<Json<UsersEmailsResponse>, MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.users_emails(&request.user_ids).await?))
}

pub async fn handle_bulk_messages(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<BulkMessagesRequest>,
) -> Result<Json<BulkMessagesResponse>, MessagesError> {
    tracing::debug!("Bulk {:?} on {} message(s)", request.action, request.ids.len());
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.bulk(user.id, request).await?))
}

pub async fn handle_get_message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.get_message(user.id, id).await?))
}

pub async fn handle_update_message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMessageRequest>,
) -> Result<Json<Message>, MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    Ok(Json(service.update_message(user.id, id, request).await?))
}

pub async fn handle_delete_message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, MessagesError> {
    let service = MessagesService::new(state.conn.clone());
    let action = match service.delete_message(user.id, id).await? {
        DeleteAction::MoveToTrash => "moved_to_trash",
        DeleteAction::HideFor(_) => "deleted_for_user",
        DeleteAction::Remove => "removed",
    };
    Ok(Json(serde_json::json!({ "id": id, "action": action })))
}
