use serde::{Deserialize, Serialize};

use crate::rotation::RotationPattern;
use crate::sink::Sink;
use crate::{ConsoleSink, Dispatcher, DispatcherOptions, FileSink, Level, Result};

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level floor: one of trace, debug, info, warning, err, fatal
    #[serde(default = "default_log_level", alias = "log_level", alias = "LogLevel")]
    pub level: String,
    /// File output configuration
    #[serde(default, alias = "FileWriter")]
    pub file_writer: FileWriterConfig,
    /// Console output configuration
    #[serde(default, alias = "ConsoleWriter")]
    pub console_writer: ConsoleWriterConfig,
}

impl LogConfig {
    /// Create a new LogConfig with defaults
    pub fn new() -> Self {
        Self {
            level: default_log_level(),
            file_writer: FileWriterConfig::default(),
            console_writer: ConsoleWriterConfig::default(),
        }
    }

    /// Set log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set file output configuration
    pub fn with_file_writer(mut self, file_writer: FileWriterConfig) -> Self {
        self.file_writer = file_writer;
        self
    }

    /// Set console output configuration
    pub fn with_console_writer(mut self, console_writer: ConsoleWriterConfig) -> Self {
        self.console_writer = console_writer;
        self
    }

    /// Parse the configured level.
    pub fn parsed_level(&self) -> Result<Level> {
        self.level.parse()
    }

    /// Start a new dispatcher configured from `self`.
    pub fn build(&self) -> Result<Dispatcher> {
        self.build_with(DispatcherOptions::default())
    }

    /// Like [`build`](Self::build) with custom dispatcher options.
    pub fn build_with(&self, options: DispatcherOptions) -> Result<Dispatcher> {
        let dispatcher = Dispatcher::with_options(options)?;
        apply(self, &dispatcher)?;
        Ok(dispatcher)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

/// File writer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWriterConfig {
    #[serde(alias = "On")]
    pub on: bool,
    /// Path of the main log file.
    #[serde(alias = "LogPath")]
    pub log_path: String,
    /// Archive template for the main log, e.g. `logs/app.log.%Y%M%D%H`
    #[serde(alias = "rotate_log_path", alias = "RotateLogPath")]
    pub rotate_pattern: String,
    /// Path of the warn-and-above log file.
    #[serde(alias = "wf_log_path", alias = "WfLogPath")]
    pub warn_log_path: String,
    /// Archive template for the warn log
    #[serde(alias = "rotate_wf_log_path", alias = "RotateWfLogPath")]
    pub warn_rotate_pattern: String,
}

impl FileWriterConfig {
    /// An enabled file writer for `log_path`.
    pub fn new(log_path: impl Into<String>) -> Self {
        Self {
            on: true,
            log_path: log_path.into(),
            ..Default::default()
        }
    }

    pub fn with_rotate_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.rotate_pattern = pattern.into();
        self
    }

    pub fn with_warn_log(mut self, path: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.warn_log_path = path.into();
        self.warn_rotate_pattern = pattern.into();
        self
    }
}

/// Console writer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleWriterConfig {
    #[serde(alias = "On")]
    pub on: bool,
    #[serde(alias = "Color")]
    pub color: bool,
}

impl ConsoleWriterConfig {
    pub fn new(color: bool) -> Self {
        Self { on: true, color }
    }
}

/// Derive the sinks described by `config`, in registration order.
///
/// Patterns are compiled here, so a syntax error surfaces before any file is
/// touched. Sinks are returned uninitialized.
pub fn sinks_for(config: &LogConfig) -> Result<Vec<Box<dyn Sink>>> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    let fw = &config.file_writer;

    if fw.on {
        let has_warn_log = !fw.warn_log_path.is_empty();
        if !fw.log_path.is_empty() {
            let ceil = if has_warn_log { Level::Info } else { Level::Error };
            let sink = FileSink::new(&fw.log_path)
                .with_band(Level::Trace, ceil)
                .with_compiled_pattern(RotationPattern::compile(&fw.rotate_pattern)?);
            sinks.push(Box::new(sink));
        }
        if has_warn_log {
            let sink = FileSink::new(&fw.warn_log_path)
                .with_band(Level::Warn, Level::Error)
                .with_compiled_pattern(RotationPattern::compile(&fw.warn_rotate_pattern)?);
            sinks.push(Box::new(sink));
        }
    }

    if config.console_writer.on {
        sinks.push(Box::new(
            ConsoleSink::new().with_color(config.console_writer.color),
        ));
    }

    Ok(sinks)
}

/// Configure `dispatcher` from `config`: set its level and register sinks.
///
/// Everything that can fail (level, patterns, sink init) is checked before
/// the first sink is attached, so an error leaves the dispatcher untouched.
pub fn apply(config: &LogConfig, dispatcher: &Dispatcher) -> Result<()> {
    let level = config.parsed_level()?;
    let mut sinks = sinks_for(config)?;
    for sink in sinks.iter_mut() {
        sink.init()?;
    }

    dispatcher.set_level(level);
    for sink in sinks {
        dispatcher.attach(sink)?;
    }
    tracing::debug!(target: "spoollog::config", level = %level, "logging configured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_log_config_new() {
        let config = LogConfig::new();
        assert_eq!(config.level, "debug");
        assert!(!config.file_writer.on);
        assert!(!config.console_writer.on);
    }

    #[test]
    fn test_log_config_builders() {
        let config = LogConfig::new()
            .with_level("err")
            .with_file_writer(FileWriterConfig::new("a.log").with_rotate_pattern("a.%Y.log"))
            .with_console_writer(ConsoleWriterConfig::new(true));
        assert_eq!(config.parsed_level().unwrap(), Level::Error);
        assert!(config.file_writer.on);
        assert_eq!(config.file_writer.rotate_pattern, "a.%Y.log");
        assert!(config.console_writer.color);
    }

    #[test]
    fn test_deserialize_toml() {
        let text = r#"
level = "warning"

[file_writer]
on = true
log_path = "logs/app.log"
rotate_pattern = "logs/app.log.%Y%M%D"
warn_log_path = "logs/app.wf.log"

[console_writer]
on = true
color = false
"#;
        let config: LogConfig = toml::from_str(text).unwrap();
        assert_eq!(config.parsed_level().unwrap(), Level::Warn);
        assert_eq!(config.file_writer.log_path, "logs/app.log");
        assert_eq!(config.file_writer.warn_log_path, "logs/app.wf.log");
        assert!(config.file_writer.warn_rotate_pattern.is_empty());
        assert!(config.console_writer.on);
    }

    #[test]
    fn test_deserialize_wf_key_names_yaml() {
        let text = r#"
log_level: trace
file_writer:
  on: true
  log_path: ./a.log
  rotate_log_path: ./a.log.%Y%M%D%H
  wf_log_path: ./a.wf.log
  rotate_wf_log_path: ./a.wf.log.%Y%M%D%H
"#;
        let config: LogConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.level, "trace");
        assert_eq!(config.file_writer.rotate_pattern, "./a.log.%Y%M%D%H");
        assert_eq!(config.file_writer.warn_log_path, "./a.wf.log");
        assert_eq!(config.file_writer.warn_rotate_pattern, "./a.wf.log.%Y%M%D%H");
        assert!(!config.console_writer.on);
    }

    #[test]
    fn test_deserialize_pascal_case_toml() {
        let text = r#"
LogLevel = "info"

[FileWriter]
On = true
LogPath = "./log_test.log"
RotateLogPath = "./log_test.log.%Y%M%D%H"
WfLogPath = "./log_test.wf.log"
RotateWfLogPath = "./log_test.wf.log.%Y%M%D%H"

[ConsoleWriter]
On = true
Color = true
"#;
        let config: LogConfig = toml::from_str(text).unwrap();
        assert_eq!(config.parsed_level().unwrap(), Level::Info);
        assert!(config.file_writer.on);
        assert_eq!(config.file_writer.log_path, "./log_test.log");
        assert_eq!(config.file_writer.rotate_pattern, "./log_test.log.%Y%M%D%H");
        assert_eq!(config.file_writer.warn_log_path, "./log_test.wf.log");
        assert_eq!(
            config.file_writer.warn_rotate_pattern,
            "./log_test.wf.log.%Y%M%D%H"
        );
        assert!(config.console_writer.on);
        assert!(config.console_writer.color);
    }

    #[test]
    fn test_sinks_for_counts() {
        let config = LogConfig::new();
        assert!(sinks_for(&config).unwrap().is_empty());

        let config = LogConfig::new()
            .with_file_writer(FileWriterConfig::new("a.log").with_warn_log("a.wf.log", ""))
            .with_console_writer(ConsoleWriterConfig::new(false));
        assert_eq!(sinks_for(&config).unwrap().len(), 3);

        // Disabled file writer ignores its paths.
        let mut fw = FileWriterConfig::new("a.log");
        fw.on = false;
        let config = LogConfig::new().with_file_writer(fw);
        assert!(sinks_for(&config).unwrap().is_empty());

        // Warn log alone.
        let fw = FileWriterConfig::new("").with_warn_log("only.wf.log", "");
        let config = LogConfig::new().with_file_writer(fw);
        assert_eq!(sinks_for(&config).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_level_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        let config = LogConfig::new()
            .with_level("verbose")
            .with_file_writer(FileWriterConfig::new(path.to_str().unwrap()));
        let err = config.build().unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(_)));
        assert!(!path.exists(), "no sink may be initialized on failure");
    }

    #[test]
    fn test_invalid_pattern_fails_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        let config = LogConfig::new().with_file_writer(
            FileWriterConfig::new(path.to_str().unwrap()).with_rotate_pattern("a.%Q.log"),
        );
        let err = config.build().unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_apply_sets_level() {
        let dispatcher = Dispatcher::new().unwrap();
        apply(&LogConfig::new().with_level("fatal"), &dispatcher).unwrap();
        assert_eq!(dispatcher.level(), Level::Fatal);
    }
}
