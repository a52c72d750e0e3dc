//! Configuration loading for the Rideflow dispatch service.
//!
//! Configuration is layered: an optional `config/default` file, an optional
//! environment-specific file selected by `RUN_ENV`, and finally `APP__`
//! prefixed environment variables (separator `__`, e.g. `APP__SERVER__PORT`).
//! A `.env` file is read once before any of that happens.

pub mod models;

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;

pub use models::{AppConfig, DatabaseConfig, FirebaseConfig, RoutingConfig, ServerConfig};

/// The prefix for configuration environment variables
pub const ENV_PREFIX: &str = "APP";

/// The separator for configuration environment variables
pub const ENV_SEPARATOR: &str = "__";

static DOTENV: OnceCell<()> = OnceCell::new();

/// Load `.env` into the process environment exactly once.
///
/// Missing `.env` files are not an error; deployments usually configure the
/// process environment directly.
pub fn ensure_dotenv_loaded() {
    DOTENV.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Load the application configuration.
///
/// Sources are merged in order of increasing priority:
///
/// 1. `config/default` (any supported format, optional)
/// 2. `config/{RUN_ENV}` (optional, `RUN_ENV` defaults to `development`)
/// 3. Environment variables prefixed with `APP__`
///
/// The `DATABASE_URL` and `ROUTING_API_KEY` variables are honoured as
/// conventional fallbacks for their respective sections.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a source file is malformed or the merged
/// configuration cannot be deserialized into [`AppConfig`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR));

    let mut config: AppConfig = builder.build()?.try_deserialize()?;

    // Conventional single-variable fallbacks.
    if config.database.is_none() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database = Some(DatabaseConfig {
                url,
                max_connections: None,
            });
        }
    }
    if let Some(routing) = config.routing.as_mut() {
        if routing.api_key.is_none() {
            routing.api_key = std::env::var("ROUTING_API_KEY").ok();
        }
    }

    Ok(config)
}
