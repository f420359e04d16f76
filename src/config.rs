use std::env;
use std::time::Duration;

use anyhow::Result;
use url::Url;

use crate::errors::SyncError;

/// Name of the fixed backup collection under the configured base URL.
pub const BACKUP_COLLECTION: &str = "afterglow";

/// Configuration for one remote backup target. The sync core receives this
/// fresh on every call and holds no persistent reference to it.
#[derive(Debug, Clone)]
pub struct WebDAVConfig {
    pub server_url: String,
    pub username: String,
    pub password: String,
    /// Relay requests through `proxy_url` instead of hitting the server
    /// directly. Needed when the host environment cannot perform
    /// credentialed cross-origin requests.
    pub use_proxy: bool,
    pub proxy_url: Option<String>,
    /// Maximum number of backups to retain on the server. `None` disables
    /// retention pruning.
    pub max_backups: Option<usize>,
    pub timeout_seconds: u64,
}

impl WebDAVConfig {
    pub fn new(server_url: String, username: String, password: String) -> Self {
        Self {
            server_url,
            username,
            password,
            use_proxy: false,
            proxy_url: None,
            max_backups: None,
            timeout_seconds: 30,
        }
    }

    /// Loads configuration from `AFTERGLOW_*` environment variables.
    ///
    /// Missing credentials are left empty here; `validate()` rejects them
    /// at the facade boundary before any network call.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let proxy_url = env::var("AFTERGLOW_PROXY_URL").ok().filter(|s| !s.is_empty());

        Ok(WebDAVConfig {
            server_url: env::var("AFTERGLOW_WEBDAV_URL").unwrap_or_default(),
            username: env::var("AFTERGLOW_WEBDAV_USERNAME").unwrap_or_default(),
            password: env::var("AFTERGLOW_WEBDAV_PASSWORD").unwrap_or_default(),
            use_proxy: proxy_url.is_some(),
            proxy_url,
            max_backups: env::var("AFTERGLOW_MAX_BACKUPS")
                .ok()
                .and_then(|s| s.parse().ok()),
            timeout_seconds: env::var("AFTERGLOW_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Validates that every field required for a network operation is
    /// populated. Called by the facade before any request is built.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.server_url.is_empty() {
            return Err(SyncError::ConfigIncomplete {
                details: "server URL is empty".to_string(),
            });
        }

        if self.username.is_empty() {
            return Err(SyncError::ConfigIncomplete {
                details: "username is empty".to_string(),
            });
        }

        if self.password.is_empty() {
            return Err(SyncError::ConfigIncomplete {
                details: "password is empty".to_string(),
            });
        }

        match Url::parse(&self.server_url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            _ => {
                return Err(SyncError::ConfigIncomplete {
                    details: format!("server URL '{}' is not a valid http(s) URL", self.server_url),
                });
            }
        }

        if self.use_proxy && self.proxy_url.as_deref().unwrap_or("").is_empty() {
            return Err(SyncError::ConfigIncomplete {
                details: "proxying is enabled but no proxy URL is configured".to_string(),
            });
        }

        Ok(())
    }

    /// URL of the backup collection, always with a trailing slash.
    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}/",
            self.server_url.trim_end_matches('/'),
            BACKUP_COLLECTION
        )
    }

    /// URL of a single backup object inside the collection.
    pub fn object_url(&self, filename: &str) -> String {
        format!("{}{}", self.collection_url(), filename)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
