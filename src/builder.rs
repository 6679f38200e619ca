//! Builder pattern for configuring a dispatcher.
//!
//! This module provides a convenient builder API for configuring and starting
//! a logging pipeline in a single chain of method calls.
//!
//! # Example
//!
//! ```rust,no_run
//! let logger = spoollog::builder()
//!     .with_level("info")
//!     .with_console(true)
//!     .with_file("logs/app.log")
//!     .with_rotate_pattern("logs/app.log.%Y%M%D%H")
//!     .with_warn_file("logs/app.wf.log")
//!     .init()
//!     .expect("Failed to initialize logging");
//!
//! logger.info(format_args!("listening on {}", 8080));
//! ```

use crate::{
    ConsoleWriterConfig, Dispatcher, DispatcherOptions, FileWriterConfig, LogConfig, Result,
};

/// A builder for configuring and starting a [`Dispatcher`].
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    config: LogConfig,
    options: DispatcherOptions,
}

impl LogBuilder {
    /// Create a new LogBuilder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a LogBuilder from an existing configuration.
    pub fn from_config(config: LogConfig) -> Self {
        Self {
            config,
            options: DispatcherOptions::default(),
        }
    }

    /// Set the level floor (trace, debug, info, warning, err, fatal).
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config = self.config.with_level(level);
        self
    }

    /// Enable or disable plain console output.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console_writer.on = enabled;
        self
    }

    /// Enable console output with ANSI colors.
    pub fn with_color_console(mut self) -> Self {
        self.config = self.config.with_console_writer(ConsoleWriterConfig::new(true));
        self
    }

    /// Write to a main log file.
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.config.file_writer.on = true;
        self.config.file_writer.log_path = path.into();
        self
    }

    /// Archive template for the main log file.
    pub fn with_rotate_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.file_writer.rotate_pattern = pattern.into();
        self
    }

    /// Route warn and error records to a separate file.
    pub fn with_warn_file(mut self, path: impl Into<String>) -> Self {
        self.config.file_writer.on = true;
        self.config.file_writer.warn_log_path = path.into();
        self
    }

    /// Archive template for the warn log file.
    pub fn with_warn_rotate_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.file_writer.warn_rotate_pattern = pattern.into();
        self
    }

    /// Replace the whole file writer section.
    pub fn with_file_config(mut self, file_writer: FileWriterConfig) -> Self {
        self.config = self.config.with_file_writer(file_writer);
        self
    }

    /// Tune queue size and timer periods.
    pub fn with_options(mut self, options: DispatcherOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the current configuration without starting anything.
    pub fn build(self) -> LogConfig {
        self.config
    }

    /// Start a dispatcher with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The level string is not recognized
    /// - A rotation pattern is malformed
    /// - A log file cannot be opened
    pub fn init(self) -> Result<Dispatcher> {
        self.config.build_with(self.options)
    }
}
