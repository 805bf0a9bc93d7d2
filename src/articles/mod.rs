pub mod error;
pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::ArticlesError;
pub use handlers::*;
pub use service::ArticlesService;
pub use types::*;

pub fn configure_articles_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::ARTICLES,
            get(handle_list_articles).post(handle_create_article),
        )
        .route(
            ApiUrls::ARTICLE_BY_ID,
            get(handle_get_article)
                .put(handle_update_article)
                .delete(handle_delete_article),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prestations::PricingType;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(description: Option<&str>, pricing: &str) -> ArticleRow {
        ArticleRow {
            id: Uuid::new_v4(),
            name: "Développement web".to_string(),
            description: description.map(str::to_string),
            default_rate: 450.0,
            pricing_type: pricing.to_string(),
            category: Some("dev".to_string()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion_parses_pricing() {
        let article = Article::from(row(None, "daily"));
        assert_eq!(article.pricing_type, PricingType::Daily);

        let fallback = Article::from(row(None, "weekly"));
        assert_eq!(fallback.pricing_type, PricingType::Hourly);
    }

    #[test]
    fn test_service_description_falls_back_to_name() {
        assert_eq!(
            Article::from(row(Some("  "), "hourly")).service_description(),
            "Développement web"
        );
        assert_eq!(
            Article::from(row(Some("Intégration"), "hourly")).service_description(),
            "Intégration"
        );
    }

    #[test]
    fn test_list_query_parses_active_flag() {
        let query: ArticleListQuery = serde_json::from_str(r#"{"active": true}"#).unwrap();
        assert_eq!(query.active, Some(true));
        assert!(query.search.is_none());
    }
}
