use crate::core::config::AppConfig;
use crate::core::shared::utils::{DbConn, DbPool};
use diesel::r2d2::PoolError;
use log::error;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub conn: DbPool,
}

impl AppState {
    pub fn new(config: AppConfig, conn: DbPool) -> Self {
        Self { config, conn }
    }

    pub fn db(&self) -> Result<DbConn, PoolError> {
        self.conn.get().map_err(|e| {
            error!("Failed to get database connection: {e}");
            e
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("server", &self.config.server)
            .field("company", &self.config.company.name)
            .field("conn", &"DbPool")
            .field("database_url", &"[REDACTED]")
            .finish()
    }
}
