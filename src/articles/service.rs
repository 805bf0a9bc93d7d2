use chrono::Utc;
use diesel::prelude::*;
use log::{error, info};
use uuid::Uuid;

use super::error::ArticlesError;
use super::types::*;
use crate::core::shared::schema::articles;
use crate::core::shared::utils::{DbConn, DbPool};

pub struct ArticlesService {
    pool: DbPool,
}

impl ArticlesService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, ArticlesError> {
        self.pool.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            ArticlesError::Connection
        })
    }

    pub async fn list_articles(&self, query: ArticleListQuery) -> Result<Vec<Article>, ArticlesError> {
        let mut conn = self.conn()?;

        let mut q = articles::table.into_boxed();

        if let Some(active) = query.active {
            q = q.filter(articles::is_active.eq(active));
        }

        if let Some(category) = query.category {
            q = q.filter(articles::category.eq(category));
        }

        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            q = q.filter(
                articles::name
                    .ilike(pattern.clone())
                    .or(articles::description.ilike(pattern)),
            );
        }

        let rows: Vec<ArticleRow> = q
            .order(articles::name.asc())
            .select(ArticleRow::as_select())
            .load(&mut conn)
            .map_err(|e| {
                error!("Failed to list articles: {e}");
                ArticlesError::from(e)
            })?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    pub async fn get_article(&self, id: Uuid) -> Result<Article, ArticlesError> {
        let mut conn = self.conn()?;
        let row: ArticleRow = articles::table
            .filter(articles::id.eq(id))
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ArticlesError::NotFound(id.to_string()))?;
        Ok(row.into())
    }

    pub async fn create_article(&self, request: CreateArticleRequest) -> Result<Article, ArticlesError> {
        validate_name(&request.name)?;
        validate_rate(request.default_rate)?;

        let mut conn = self.conn()?;
        let now = Utc::now();
        let row = ArticleRow {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            default_rate: request.default_rate,
            pricing_type: request.pricing_type.unwrap_or_default().to_string(),
            category: request.category,
            is_active: request.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(articles::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to create article: {e}");
                ArticlesError::from(e)
            })?;

        info!("Created article {} ({})", row.name, row.id);
        Ok(row.into())
    }

    pub async fn update_article(
        &self,
        id: Uuid,
        request: UpdateArticleRequest,
    ) -> Result<Article, ArticlesError> {
        let current = self.get_article(id).await?;

        let name = request.name.unwrap_or(current.name);
        validate_name(&name)?;
        let default_rate = request.default_rate.unwrap_or(current.default_rate);
        validate_rate(default_rate)?;

        let mut conn = self.conn()?;
        let row: ArticleRow = diesel::update(articles::table.filter(articles::id.eq(id)))
            .set((
                articles::name.eq(name.trim()),
                articles::description.eq(request.description.or(current.description)),
                articles::default_rate.eq(default_rate),
                articles::pricing_type.eq(request
                    .pricing_type
                    .unwrap_or(current.pricing_type)
                    .to_string()),
                articles::category.eq(request.category.or(current.category)),
                articles::is_active.eq(request.is_active.unwrap_or(current.is_active)),
                articles::updated_at.eq(Utc::now()),
            ))
            .returning(ArticleRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| {
                error!("Failed to update article {id}: {e}");
                ArticlesError::from(e)
            })?;

        Ok(row.into())
    }

    pub async fn delete_article(&self, id: Uuid) -> Result<(), ArticlesError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(articles::table.filter(articles::id.eq(id)))
            .execute(&mut conn)
            .map_err(|e| {
                error!("Failed to delete article {id}: {e}");
                ArticlesError::from(e)
            })?;

        if deleted == 0 {
            return Err(ArticlesError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ArticlesError> {
    if name.trim().is_empty() {
        return Err(ArticlesError::Validation("name is required".to_string()));
    }
    Ok(())
}

fn validate_rate(rate: f64) -> Result<(), ArticlesError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ArticlesError::Validation(
            "default_rate must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
