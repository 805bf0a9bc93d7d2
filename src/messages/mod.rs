//! Internal inbox between users.
//!
//! A message is a single row shared by sender and recipient. What each of
//! them sees is derived from the folder and flags; deletion is per user.

pub mod error;
pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::MessagesError;
pub use handlers::*;
pub use service::MessagesService;
pub use types::*;

pub fn configure_messages_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::MESSAGES,
            get(handle_list_messages).post(handle_compose_message),
        )
        .route(ApiUrls::MESSAGES_COUNTS, get(handle_message_counts))
        .route(ApiUrls::MESSAGES_USERS_EMAILS, post(handle_users_emails))
        .route(ApiUrls::MESSAGES_BULK, post(handle_bulk_messages))
        .route(
            ApiUrls::MESSAGE_BY_ID,
            get(handle_get_message)
                .patch(handle_update_message)
                .delete(handle_delete_message),
        )
}
