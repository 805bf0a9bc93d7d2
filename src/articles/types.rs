use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::schema::articles;
use crate::prestations::PricingType;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub default_rate: f64,
    pub pricing_type: String,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reusable service template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub default_rate: f64,
    pub pricing_type: PricingType,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            default_rate: row.default_rate,
            pricing_type: row.pricing_type.parse().unwrap_or_default(),
            category: row.category,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Article {
    /// Text used as the service description when prefilling.
    pub fn service_description(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d.to_string(),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticleRequest {
    pub name: String,
    pub description: Option<String>,
    pub default_rate: f64,
    pub pricing_type: Option<PricingType>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_rate: Option<f64>,
    pub pricing_type: Option<PricingType>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleListQuery {
    pub active: Option<bool>,
    pub category: Option<String>,
    pub search: Option<String>,
}
