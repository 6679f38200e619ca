//! # Spoollog
//!
//! An asynchronous, in-process logging pipeline.
//!
//! ## Features
//!
//! - Producers on any thread submit records to a bounded queue; one worker
//!   thread writes them to every registered sink in order
//! - Console output, plain or ANSI-colored
//! - Buffered file output with an inclusive level band per file, so a main
//!   log and a separate warn (`.wf`) log can share one pipeline
//! - Time-pattern rotation (`%Y %M %D %H %m`) that archives the period that
//!   just ended
//! - Optional bridge from the `tracing` ecosystem
//!
//! ## Example
//!
//! ```rust,no_run
//! use spoollog::{ConsoleWriterConfig, FileWriterConfig, LogConfig};
//!
//! let config = LogConfig::new()
//!     .with_level("info")
//!     .with_file_writer(
//!         FileWriterConfig::new("logs/app.log")
//!             .with_rotate_pattern("logs/app.log.%Y%M%D%H")
//!             .with_warn_log("logs/app.wf.log", "logs/app.wf.log.%Y%M%D%H"),
//!     )
//!     .with_console_writer(ConsoleWriterConfig::new(true));
//!
//! let logger = config.build()?;
//! spoollog::info!(logger: &logger, "listening on {}", 8080);
//! logger.shutdown();
//! # Ok::<(), spoollog::Error>(())
//! ```

pub mod builder;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod global;
pub mod level;
pub mod record;
pub mod rotation;
pub mod sink;
pub mod writer;

#[cfg(feature = "tracing-bridge")]
pub mod tracing_init;

pub use builder::LogBuilder;
pub use config::{ConsoleWriterConfig, FileWriterConfig, LogConfig};
pub use console::ConsoleSink;
pub use dispatcher::{Dispatcher, DispatcherOptions};
pub use error::{Error, Result};
pub use level::Level;
pub use record::{Record, RecordPool};
pub use rotation::{RotationPattern, TimeField};
pub use sink::{Flusher, Rotater, Sink};
pub use writer::FileSink;

#[cfg(feature = "tracing-bridge")]
pub use tracing_init::{DispatchLayer, init_tracing};

/// Start building a logging configuration.
pub fn builder() -> LogBuilder {
    LogBuilder::new()
}
