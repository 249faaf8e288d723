// Application state shared by every handler and middleware

use std::sync::Arc;
use crate::config::environment::EnvironmentVariables;
use crate::database::DatabaseService;
use crate::pagination::Pagination;
use crate::ratelimit::{RateLimitPolicy, RateLimiter};

/// Header prefix used by the analyst-facing API
pub const DO_HEADER_PREFIX: &str = "DO-";
/// Header prefix used by the customer portal API
pub const CP_HEADER_PREFIX: &str = "CP-";

#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub database: DatabaseService,
    /// Counters shared by both API surfaces; each surface uses its own key scope
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Builds the state from a loaded configuration.
    /// The database pool stays uninitialized until `init_database` runs.
    pub fn new(environment: EnvironmentVariables) -> Self {
        let environment_arc: Arc<EnvironmentVariables> = Arc::new(environment);
        let database: DatabaseService = DatabaseService::new(environment_arc.clone());

        Self {
            environment: environment_arc,
            database,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// Loads configuration from the process environment (and `.env`)
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(EnvironmentVariables::load()?))
    }

    /// Creates the connection pool and bootstraps the schema
    pub async fn init_database(&self) -> anyhow::Result<()> {
        self.database.initialize().await?;
        tracing::info!("Database initialized successfully");
        Ok(())
    }

    /// Gracefully shutdown all database connections
    pub async fn shutdown(&self) {
        self.database.shutdown().await;
    }

    pub fn do_pagination(&self) -> Pagination {
        Pagination::from_env(&self.environment, DO_HEADER_PREFIX)
    }

    pub fn cp_pagination(&self) -> Pagination {
        Pagination::from_env(&self.environment, CP_HEADER_PREFIX)
    }

    pub fn do_rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            "api",
            self.environment.do_rate_limit,
            self.environment.do_rate_period,
            DO_HEADER_PREFIX,
        )
    }

    pub fn cp_rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            "cp",
            self.environment.cp_rate_limit,
            self.environment.cp_rate_period,
            CP_HEADER_PREFIX,
        )
    }
}
