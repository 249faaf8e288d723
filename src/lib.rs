// Library root for the do-portal API: analyst and customer portal surfaces

pub mod api;
pub mod config;
pub mod core;
pub mod database;
pub mod models;
pub mod pagination;
pub mod ratelimit;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::core::server::create_app;
pub use crate::database::DatabaseService;
