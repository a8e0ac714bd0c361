use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use playstore_core::config::{Settings, DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};

pub fn get_configuration_with_paths(
    current_dir_path: Option<PathBuf>,
    system_config_dir_path: Option<PathBuf>,
) -> Result<Settings, config::ConfigError> {
    let config_directory = current_dir_path.unwrap_or_else(|| {
        std::env::current_dir()
            .map(|p| p.join("config"))
            .unwrap_or_else(|_| PathBuf::from("config"))
    });

    let system_config_dir = if let Some(path) = system_config_dir_path {
        path
    } else {
        ProjectDirs::from("com", "playstore", "playstore")
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config"))
    };

    let settings = Config::builder()
        .set_default("api.base_url", DEFAULT_API_BASE_URL)?
        .set_default("http.timeout_secs", 30)?
        .set_default("http.connect_timeout_secs", 10)?
        .set_default("http.user_agent", DEFAULT_USER_AGENT)?
        .set_default("log_level", "info")?
        .add_source(File::from(system_config_dir.join("config.toml")).required(false))
        .add_source(File::from(config_directory.join("config.toml")).required(false))
        .add_source(Environment::with_prefix("PLAYSTORE").separator("__"))
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    get_configuration_with_paths(None, None)
}
