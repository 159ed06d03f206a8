use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};

/// Where list diagnostics go once [`init`] has run.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub terminal_level: LevelFilter,
    /// Also write records to this file, truncating it first.
    pub file: Option<PathBuf>,
    pub file_level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            terminal_level: LevelFilter::Warn,
            file: None,
            file_level: LevelFilter::Debug,
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    Io(io::Error),
    AlreadyInitialized(log::SetLoggerError),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Io(e) => write!(f, "couldn't open log file: {e}"),
            LoggingError::AlreadyInitialized(e) => write!(f, "logger already set: {e}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::Io(e) => Some(e),
            LoggingError::AlreadyInitialized(e) => Some(e),
        }
    }
}

impl From<io::Error> for LoggingError {
    fn from(e: io::Error) -> Self {
        LoggingError::Io(e)
    }
}

impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self {
        LoggingError::AlreadyInitialized(e)
    }
}

/// Installs the global logger. Only the first successful call in a process
/// has any effect; later ones return [`LoggingError::AlreadyInitialized`].
pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(config.terminal_level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto));

    if let Some(path) = &config.file {
        loggers.push(WriteLogger::new(config.file_level, Config::default(), File::create(path)?));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.terminal_level, LevelFilter::Warn);
        assert_eq!(config.file_level, LevelFilter::Debug);
        assert!(config.file.is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_bad_log_file() {
        let config = LogConfig {
            file: Some(std::env::temp_dir().join("seqlist-missing-dir").join("nope").join("list.log")),
            ..LogConfig::default()
        };

        // fails before the global logger is touched
        let err = init(&config).unwrap_err();
        assert!(matches!(err, LoggingError::Io(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("couldn't open log file"));
    }
}
