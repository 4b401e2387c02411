use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to bind (`FEATURE_FLAG_PORT`, then `PORT`).
    pub port: u16,
    /// Backing file for the persisted state (`FEATURE_FLAG_DATA_FILE`).
    pub data_file: PathBuf,
    /// Bootstrap admin credential (`FEATURE_FLAG_ADMIN_KEY`). Used only when
    /// the loaded store has no API keys at all.
    pub admin_key: Option<String>,
    /// Reject disabled API keys during authorization
    /// (`FEATURE_FLAG_ENFORCE_KEY_ENABLED`). Off by default; see DESIGN.md.
    pub enforce_key_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("FEATURE_FLAG_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);

        let data_file = env::var("FEATURE_FLAG_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data.json"));

        let admin_key = env::var("FEATURE_FLAG_ADMIN_KEY").ok();

        let enforce_key_enabled = env::var("FEATURE_FLAG_ENFORCE_KEY_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            port,
            data_file,
            admin_key,
            enforce_key_enabled,
        }
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration, read from the environment once.
pub fn config() -> &'static AppConfig {
    &CONFIG
}
