use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::subscriber::set_global_default;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Directory for rolling log files
pub fn log_directory() -> PathBuf {
    ProjectDirs::from("com", "playstore", "playstore")
        .map(|d| d.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber: stderr output plus a daily log file.
/// `RUST_LOG` overrides `env_filter`. Keep the returned guard alive so
/// buffered file output is flushed.
pub fn init_subscriber(name: &str, env_filter: &str) -> WorkerGuard {
    LogTracer::init().expect("failed to initialize log tracer bridge");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let formatting_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .pretty();

    let file_appender = tracing_appender::rolling::daily(log_directory(), format!("{}.log", name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(formatting_layer)
        .with(file_layer);

    set_global_default(subscriber).expect("failed to set global tracing subscriber");

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_ends_with_logs() {
        assert!(log_directory().ends_with("logs"));
    }

    // Installs a global subscriber; run with --test-threads=1 if other tests do too.
    #[test]
    fn test_init_subscriber() {
        let _guard = init_subscriber("test_app", "info");
    }
}
