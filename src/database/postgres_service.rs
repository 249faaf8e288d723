// PostgreSQL access for the portal: one lazily created pool plus the
// idempotent schema script that creates every table the portal uses.

use std::{sync::Arc, time::Duration};
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{ConnectOptions, Executor, PgPool};
use tokio::sync::OnceCell;
use tracing::{debug, info, log::LevelFilter};

use crate::config::environment::EnvironmentVariables;

/// Idempotent; safe to run on every start
pub const SCHEMA_SQL: &str = include_str!("sql/schemas/schema_init.sql");
const APPLICATION_NAME: &str = "do-portal";
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared handle on the connection pool.
///
/// Cloning is cheap; every clone sees the same pool once `initialize` ran.
/// Handlers call `get_pool` and turn a missing pool into a 500.
#[derive(Clone, Debug)]
pub struct DatabaseService {
    pool: Arc<OnceCell<PgPool>>,
    config: Arc<EnvironmentVariables>,
}

impl DatabaseService {
    pub fn new(config: Arc<EnvironmentVariables>) -> Self {
        Self {
            pool: Arc::new(OnceCell::new()),
            config,
        }
    }

    /// Connects and bootstraps the schema. Calling it again reuses the pool
    /// and re-runs the (idempotent) schema script.
    pub async fn initialize(&self) -> Result<()> {
        let pool: &PgPool = self
            .pool
            .get_or_try_init(|| async {
                info!(
                    "Connecting to postgres://{}@{}:{}/{}",
                    self.config.db_user, self.config.db_host, self.config.db_port, self.config.db_name
                );
                pool_options(&self.config)
                    .connect_with(connect_options(&self.config))
                    .await
                    .context("Failed to create database connection pool")
            })
            .await?;

        pool.execute(SCHEMA_SQL)
            .await
            .context("Failed to execute schema initialization SQL")?;

        info!("Database schema ready");
        Ok(())
    }

    pub async fn shutdown(&self) {
        match self.pool.get() {
            Some(pool) => {
                pool.close().await;
                info!("Database connection pool closed");
            }
            None => debug!("Database pool was never initialized, nothing to close"),
        }
    }

    pub fn get_pool(&self) -> Result<&PgPool> {
        self.pool.get().context("Database pool not initialized")
    }
}

/// Pool sizing; acquiring a connection never outlives the request timeout
pub fn pool_options(env: &EnvironmentVariables) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(env.db_max_connections.max(1))
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(env.default_timeout_seconds.max(1)))
        .idle_timeout(IDLE_TIMEOUT)
}

/// Sessions run in UTC; TLS is optional in development only
pub fn connect_options(env: &EnvironmentVariables) -> PgConnectOptions {
    let ssl_mode: PgSslMode = if env.is_development() {
        PgSslMode::Prefer
    } else {
        PgSslMode::Require
    };

    PgConnectOptions::new()
        .host(&env.db_host)
        .port(env.db_port)
        .username(&env.db_user)
        .password(&env.db_password)
        .database(&env.db_name)
        .application_name(APPLICATION_NAME)
        .options([("timezone", "UTC")])
        .ssl_mode(ssl_mode)
        .log_statements(LevelFilter::Debug)
}
