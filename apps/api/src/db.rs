use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates a PostgreSQL connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_migrations_ordered_and_email_not_unique() {
        let migrator = sqlx::migrate!("./migrations");
        let versions: Vec<i64> = migrator.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));

        let last_email_change = migrator
            .iter()
            .filter(|m| m.sql.contains("users_email"))
            .last()
            .unwrap();
        assert!(last_email_change.sql.contains("DROP CONSTRAINT IF EXISTS users_email_key"));
    }
}
