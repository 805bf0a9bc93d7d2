use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::error::ArticlesError;
use super::service::ArticlesService;
use super::types::*;
use crate::core::shared::state::AppState;

pub async fn handle_list_articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<Vec<Article>>, ArticlesError> {
    let service = ArticlesService::new(state.conn.clone());
    Ok(Json(service.list_articles(query).await?))
}

pub async fn handle_create_article(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Article>), ArticlesError> {
    let service = ArticlesService::new(state.conn.clone());
    let article = service.create_article(request).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn handle_get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, ArticlesError> {
    let service = ArticlesService::new(state.conn.clone());
    Ok(Json(service.get_article(id).await?))
}

pub async fn handle_update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<Article>, ArticlesError> {
    let service = ArticlesService::new(state.conn.clone());
    Ok(Json(service.update_article(id, request).await?))
}

pub async fn handle_delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ArticlesError> {
    let service = ArticlesService::new(state.conn.clone());
    service.delete_article(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
