use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Production Android Publisher endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://androidpublisher.googleapis.com/";

pub const DEFAULT_USER_AGENT: &str = concat!("playstore/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub credentials: CredentialSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CredentialSettings {
    /// Path to the service account JSON key
    pub key_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Application package used when a command does not name one
    pub package_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: CredentialSettings::default(),
            api: ApiSettings::default(),
            http: HttpSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            package_name: None,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
