use std::path::PathBuf;

use color_eyre::Report;
use directories::ProjectDirs;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    Layer, filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for file output
    pub file_level: Level,
    /// Log level for console output
    pub console_level: Level,
    /// Directory where log files should be written
    pub log_dir: Option<PathBuf>,
    /// Whether to enable JSON formatted logs for structured output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_level: Level::DEBUG,
            console_level: Level::WARN,
            log_dir: Some(Self::default_log_dir()),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Get the OS-appropriate default log directory
    pub fn default_log_dir() -> PathBuf {
        match ProjectDirs::from("", "", "rogueterm") {
            // ~/.cache/rogueterm on Linux
            Some(proj_dirs) => proj_dirs.cache_dir().to_path_buf(),
            None => PathBuf::from("rogueterm-logs"),
        }
    }

    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let level = |key: &str| var(key).and_then(|value| value.parse::<Level>().ok());

        if let Some(parsed_level) = level("ROGUETERM_LOG_LEVEL") {
            config.file_level = parsed_level;
            config.console_level = parsed_level;
        }

        if let Some(parsed_level) = level("ROGUETERM_FILE_LOG_LEVEL") {
            config.file_level = parsed_level;
        }

        if let Some(parsed_level) = level("ROGUETERM_CONSOLE_LOG_LEVEL") {
            config.console_level = parsed_level;
        }

        if let Some(log_dir) = var("ROGUETERM_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(log_dir));
        }

        if var("ROGUETERM_NO_FILE_LOGS").is_some() {
            config.log_dir = None;
        }

        if var("ROGUETERM_JSON_LOGS").is_some() {
            config.json_format = true;
        }

        config
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, Report> {
    let mut layers = vec![];
    let mut guard = None;

    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "window-console.log");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let file_filter = EnvFilter::builder()
            .with_default_directive(config.file_level.into())
            .from_env_lossy();

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(file_filter)
                .boxed()
        } else {
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(file_filter)
                .boxed()
        };

        layers.push(file_layer);
    }

    let console_filter = EnvFilter::builder()
        .with_default_directive(config.console_level.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(false) // Hide module paths for cleaner console output
        .with_filter(console_filter)
        .boxed();

    layers.push(console_layer);

    tracing_subscriber::registry().with(layers).init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> LoggingConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        LoggingConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_with(&[]);

        assert_eq!(config.file_level, Level::DEBUG);
        assert_eq!(config.console_level, Level::WARN);
        assert!(config.log_dir.is_some());
        assert!(!config.json_format);
    }

    #[test]
    fn specific_levels_override_shared_level() {
        let config = config_with(&[
            ("ROGUETERM_LOG_LEVEL", "info"),
            ("ROGUETERM_CONSOLE_LOG_LEVEL", "error"),
        ]);

        assert_eq!(config.file_level, Level::INFO);
        assert_eq!(config.console_level, Level::ERROR);
    }

    #[test]
    fn file_logs_can_be_disabled() {
        let config = config_with(&[
            ("ROGUETERM_LOG_DIR", "/tmp/rogueterm"),
            ("ROGUETERM_NO_FILE_LOGS", "1"),
            ("ROGUETERM_JSON_LOGS", "1"),
        ]);

        assert_eq!(config.log_dir, None);
        assert!(config.json_format);
    }

    #[test]
    fn unparsable_level_is_ignored() {
        let config = config_with(&[("ROGUETERM_LOG_LEVEL", "loud")]);
        assert_eq!(config.file_level, Level::DEBUG);
    }
}
