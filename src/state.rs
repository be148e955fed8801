use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Sync tuning (adjustable at runtime from the console).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period before a field edit is written to the server.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
        }
    }
}

/// Process-level settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub api_url: String,
    pub sync: SyncConfig,
}

impl DeskConfig {
    /// Read `DOCDESK_API_URL` (from the environment or a `.env` file).
    pub fn from_env() -> Self {
        Self::from_api_url(dotenv::var("DOCDESK_API_URL").ok())
    }

    /// A missing or blank URL falls back to [`DEFAULT_API_URL`].
    pub fn from_api_url(value: Option<String>) -> Self {
        let api_url = value
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            api_url,
            sync: SyncConfig::default(),
        }
    }
}
