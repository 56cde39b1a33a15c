use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseConnection};

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the shared connection pool for the credential store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect and ping once. Callers treat failure as fatal.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(&config.connection)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        Self::health_check(&pool).await?;

        info!("Connected to the database (max_connections={})", config.max_connections);
        Ok(pool)
    }

    fn connect_options(connection: &DatabaseConnection) -> Result<PgConnectOptions, DatabaseError> {
        match connection {
            DatabaseConnection::Url(url) => url
                .parse::<PgConnectOptions>()
                .map_err(|_| DatabaseError::InvalidDatabaseUrl),
            DatabaseConnection::Parts { host, port, user, password, name } => {
                let options = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user)
                    .database(name);
                Ok(match password {
                    Some(password) => options.password(password),
                    None => options,
                })
            }
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
