use crate::core::config::DatabaseConfig;
use diesel::{
    r2d2::{ConnectionManager, Pool, PooledConnection},
    PgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool, anyhow::Error> {
    let manager = ConnectionManager::<PgConnection>::new(&config.url);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(manager)?;
    info!("Database pool ready (max {} connections)", config.pool_size);
    Ok(pool)
}

/// Pool that only connects on first checkout.
pub fn create_lazy_conn(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(1).build_unchecked(manager)
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run database migrations
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(
        |e| -> Box<dyn std::error::Error + Send + Sync> {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Migration error: {}", e),
            ))
        },
    )?;
    info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Names of the embedded migrations the database has not applied yet.
pub fn pending_migrations(
    conn: &mut PgConnection,
) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
    let pending = conn.pending_migrations(MIGRATIONS)?;
    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}

/// Rounds a currency amount to cents for display and exports.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn format_euros(amount: f64) -> String {
    format!("{:.2} €", amount)
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(212.004), 212.0);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(0.0), 0.0);
    }

    #[test]
    fn test_format_euros() {
        assert_eq!(format_euros(788.0), "788.00 €");
        assert_eq!(format_euros(12.3456), "12.35 €");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Dupont" & fils</b>"#),
            "&lt;b&gt;&quot;Dupont&quot; &amp; fils&lt;/b&gt;"
        );
        assert_eq!(escape_html("l'atelier"), "l&#39;atelier");
    }
}
