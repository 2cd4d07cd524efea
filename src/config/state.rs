// Application state module
// Explicit context handed to every request handler

use super::types::Config;
use crate::logger;
use crate::store::{Store, StoreError};
use crate::upload::UploadDir;

/// Application state
///
/// Opened once at process start and closed once at shutdown; handlers only
/// ever borrow it.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub uploads: UploadDir,
}

impl AppState {
    /// Open the database and the upload directory, creating both if absent
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        let store = Store::open(&config.storage.database_path)?;
        let uploads = UploadDir::create(&config.storage.upload_dir)?;
        Ok(Self::with_parts(config, store, uploads))
    }

    /// Assemble state from already opened parts
    pub fn with_parts(config: &Config, store: Store, uploads: UploadDir) -> Self {
        Self {
            config: config.clone(),
            store,
            uploads,
        }
    }

    /// In-memory store plus an upload directory under `dir`
    #[cfg(test)]
    pub fn for_tests(dir: &std::path::Path) -> Self {
        let mut config = Config::load_from("does-not-exist/config").expect("default config");
        config.logging.access_log = false;
        config.storage.upload_dir = dir.join("uploads").display().to_string();
        let store = Store::open_in_memory().expect("in-memory store");
        let uploads = UploadDir::create(&config.storage.upload_dir).expect("upload dir");
        Self::with_parts(&config, store, uploads)
    }

    /// Release the database connection
    pub fn close(&self) {
        match self.store.close() {
            Ok(()) => logger::log_info(&format!(
                "[Store] Closed database {}",
                self.store.path().display()
            )),
            Err(e) => logger::log_error(&format!("Failed to close database: {e}")),
        }
    }
}
