// Start of file: /src/config/environment.rs

// * Environment configuration with zero-copy defaults.
// * Loaded once at startup and shared through the app state.

use std::{borrow::Cow, collections::HashMap, str::FromStr};
// * anyhow for convenient error handling
use anyhow::{Context, Result};
use tracing::warn;

// ! Default values for environment variables (used if variables aren't set):
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PROTOCOL: &str = "http";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "postgres";
const DEFAULT_DB_NAME: &str = "do_portal";
const DEFAULT_CP_SERVER: &str = "http://127.0.0.1:5002";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_BODY_SIZE: usize = 2_097_152; // 2MB
const DEFAULT_TIMEOUT: u64 = 3; // 3 seconds
const DEFAULT_DB_PORT: u16 = 5432; // Default Postgres port
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DO_RATE_LIMIT: u64 = 50;
const DEFAULT_DO_RATE_PERIOD: u64 = 1;
const DEFAULT_CP_RATE_LIMIT: u64 = 30;
const DEFAULT_CP_RATE_PERIOD: u64 = 1;
const DEFAULT_PER_PAGE: u64 = 20;
const DEFAULT_MAX_PER_PAGE: u64 = 20;

// * A struct containing all environment variables used by the app
#[derive(Clone, Debug)]
pub struct EnvironmentVariables {
    pub environment: Cow<'static, str>,
    pub host: Cow<'static, str>,
    pub port: u16,
    pub protocol: Cow<'static, str>,
    pub max_request_body_size: usize,
    pub default_timeout_seconds: u64,
    pub db_host: Cow<'static, str>,
    pub db_port: u16,
    pub db_user: Cow<'static, str>,
    pub db_password: Cow<'static, str>,
    pub db_name: Cow<'static, str>,
    pub db_max_connections: u32,
    // * Requests per period for the analyst (DO) surface
    pub do_rate_limit: u64,
    pub do_rate_period: u64,
    // * Requests per period for the customer portal (CP) surface
    pub cp_rate_limit: u64,
    pub cp_rate_period: u64,
    pub default_per_page: u64,
    pub max_per_page: u64,
    // * Origin allowed to call the CP surface from a browser
    pub cp_server: Cow<'static, str>,
}

impl EnvironmentVariables {
    // * Loads environment variables.
    // * Only reads .env if ENVIRONMENT != "production".
    pub fn load() -> Result<Self> {
        // ? In non-production environments, attempt to load .env
        if std::env::var("ENVIRONMENT").unwrap_or_default() != "production" {
            dotenv::dotenv().ok();
        }

        // * Collect all environment vars from the system and .env
        let vars: HashMap<String, String> = std::env::vars().collect();

        Self::from_vars(&vars)
    }

    // * Builds the configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        // * A small helper closure to fetch a variable by key
        let get_var = |key: &str| vars.get(key).map(String::as_str);

        // * Owned string or a borrowed default, warning when the default is used
        let text = |key: &str, default: &'static str, warn_missing: bool| -> Cow<'static, str> {
            match get_var(key) {
                Some(value) => Cow::Owned(value.to_owned()),
                None => {
                    if warn_missing {
                        warn!("Missing {key}, defaulting to '{default}'");
                    }
                    Cow::Borrowed(default)
                }
            }
        };

        Ok(Self {
            environment: text("ENVIRONMENT", DEFAULT_ENVIRONMENT, true),
            host: text("HOST", DEFAULT_HOST, false),
            port: parse_var(get_var("PORT"), "PORT", DEFAULT_PORT)?,
            protocol: text("PROTOCOL", DEFAULT_PROTOCOL, false),
            max_request_body_size: parse_var(
                get_var("MAX_REQUEST_BODY_SIZE"),
                "MAX_REQUEST_BODY_SIZE",
                DEFAULT_MAX_BODY_SIZE,
            )?,
            default_timeout_seconds: parse_var(
                get_var("DEFAULT_TIMEOUT_SECONDS"),
                "DEFAULT_TIMEOUT_SECONDS",
                DEFAULT_TIMEOUT,
            )?,
            db_host: text("DB_HOST", DEFAULT_DB_HOST, true),
            db_port: parse_var(get_var("DB_PORT"), "DB_PORT", DEFAULT_DB_PORT)?,
            db_user: text("DB_USER", DEFAULT_DB_USER, true),
            db_password: text("DB_PASSWORD", DEFAULT_DB_PASSWORD, true),
            db_name: text("DB_NAME", DEFAULT_DB_NAME, true),
            db_max_connections: parse_var(
                get_var("DB_MAX_CONNECTIONS"),
                "DB_MAX_CONNECTIONS",
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            do_rate_limit: parse_var(get_var("DO_RATE_LIMIT"), "DO_RATE_LIMIT", DEFAULT_DO_RATE_LIMIT)?,
            do_rate_period: parse_var(get_var("DO_RATE_PERIOD"), "DO_RATE_PERIOD", DEFAULT_DO_RATE_PERIOD)?,
            cp_rate_limit: parse_var(get_var("CP_RATE_LIMIT"), "CP_RATE_LIMIT", DEFAULT_CP_RATE_LIMIT)?,
            cp_rate_period: parse_var(get_var("CP_RATE_PERIOD"), "CP_RATE_PERIOD", DEFAULT_CP_RATE_PERIOD)?,
            default_per_page: parse_var(get_var("DEFAULT_PER_PAGE"), "DEFAULT_PER_PAGE", DEFAULT_PER_PAGE)?,
            max_per_page: parse_var(get_var("MAX_PER_PAGE"), "MAX_PER_PAGE", DEFAULT_MAX_PER_PAGE)?,
            cp_server: text("CP_SERVER", DEFAULT_CP_SERVER, false),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEFAULT_ENVIRONMENT
    }
}

impl Default for EnvironmentVariables {
    fn default() -> Self {
        Self {
            environment: Cow::Borrowed(DEFAULT_ENVIRONMENT),
            host: Cow::Borrowed(DEFAULT_HOST),
            port: DEFAULT_PORT,
            protocol: Cow::Borrowed(DEFAULT_PROTOCOL),
            max_request_body_size: DEFAULT_MAX_BODY_SIZE,
            default_timeout_seconds: DEFAULT_TIMEOUT,
            db_host: Cow::Borrowed(DEFAULT_DB_HOST),
            db_port: DEFAULT_DB_PORT,
            db_user: Cow::Borrowed(DEFAULT_DB_USER),
            db_password: Cow::Borrowed(DEFAULT_DB_PASSWORD),
            db_name: Cow::Borrowed(DEFAULT_DB_NAME),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            do_rate_limit: DEFAULT_DO_RATE_LIMIT,
            do_rate_period: DEFAULT_DO_RATE_PERIOD,
            cp_rate_limit: DEFAULT_CP_RATE_LIMIT,
            cp_rate_period: DEFAULT_CP_RATE_PERIOD,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            cp_server: Cow::Borrowed(DEFAULT_CP_SERVER),
        }
    }
}

// * Parses an optional variable, falling back to `default` when it is unset
fn parse_var<T>(raw: Option<&str>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|s| s.trim().parse::<T>().with_context(|| format!("Invalid {key} value")))
        .transpose()
        .map(|value| value.unwrap_or(default))
}


// End of file: /src/config/environment.rs
