use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type DbPool = Pool<Postgres>;

pub async fn connect_to_db(connection_string: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(connection_string)?;

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(Duration::from_secs(600))
        .connect_with(options)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}
