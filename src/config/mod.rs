// Configuration module entry point
// Loads layered configuration and owns the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
    StorageConfig,
};

/// Default configuration file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// 16 MiB, the largest request body the server accepts
pub const DEFAULT_MAX_BODY_SIZE: u64 = 16 * 1024 * 1024;

impl Config {
    /// Load configuration from specified file path (without extension).
    ///
    /// Sources, lowest priority first: built-in defaults, the optional file,
    /// then `GALLERY_*` environment variables (`__` separates nesting levels,
    /// e.g. `GALLERY_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(config_path).required(false))
            .add_source(
                ::config::Environment::with_prefix("GALLERY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("storage.database_path", "site.db")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "gallery-events")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", DEFAULT_MAX_BODY_SIZE)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
