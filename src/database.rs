//! database (db) structure.
use axum::extract::FromRef;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::AppState;
use crate::config::Postgres;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "chatbrewery";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(config: &Postgres) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);
        let postgres = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options)
            .await?;

        tracing::info!(host = %config.host, db = %config.database, "postgres connected");

        Ok(Self { postgres })
    }

    /// Create or update tables.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.postgres).await?;
        tracing::debug!("migrations applied");
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.postgres.close().await;
        tracing::info!("postgres connections closed");
    }
}

impl From<PgPool> for Database {
    fn from(postgres: PgPool) -> Self {
        Self { postgres }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}
