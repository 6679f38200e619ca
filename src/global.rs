//! Process-wide default dispatcher.
//!
//! Passing a [`Dispatcher`] handle around is the primary API; this module
//! offers a lazily created shared instance for code that prefers free
//! functions and macros. [`shutdown`] drains and clears it, after which the
//! next use starts a fresh one.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

use crate::{Dispatcher, Error, Level, LogConfig, Result, config};

static DEFAULT: Lazy<Mutex<Option<Arc<Dispatcher>>>> = Lazy::new(|| Mutex::new(None));

fn slot() -> MutexGuard<'static, Option<Arc<Dispatcher>>> {
    DEFAULT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Configure a fresh default dispatcher from `config`.
///
/// Fails if a default already exists; call [`shutdown`] first to replace it.
pub fn init(config: &LogConfig) -> Result<()> {
    let mut slot = slot();
    if slot.is_some() {
        return Err(Error::Init("default dispatcher already initialized".to_string()));
    }
    *slot = Some(Arc::new(config.build()?));
    Ok(())
}

/// Apply `config` to the default dispatcher, creating it if needed.
pub fn setup(config: &LogConfig) -> Result<()> {
    let d = handle()?;
    config::apply(config, &d)
}

/// The default dispatcher, created with no sinks on first use.
pub fn handle() -> Result<Arc<Dispatcher>> {
    let mut slot = slot();
    if let Some(d) = slot.as_ref() {
        return Ok(d.clone());
    }
    let d = Arc::new(Dispatcher::new()?);
    *slot = Some(d.clone());
    Ok(d)
}

/// Whether a default dispatcher currently exists.
pub fn is_initialized() -> bool {
    slot().is_some()
}

pub fn set_level(level: Level) -> Result<()> {
    handle()?.set_level(level);
    Ok(())
}

pub fn set_time_layout(layout: &str) -> Result<()> {
    handle()?.set_time_layout(layout)
}

/// Drain, flush and discard the default dispatcher.
pub fn shutdown() {
    let taken = slot().take();
    if let Some(d) = taken {
        d.shutdown();
    }
}

/// Queue a record on the default dispatcher.
#[track_caller]
pub fn log(level: Level, args: fmt::Arguments<'_>) -> Result<()> {
    handle()?.log(level, args)
}

#[track_caller]
pub fn trace(args: fmt::Arguments<'_>) {
    let _ = log(Level::Trace, args);
}

#[track_caller]
pub fn debug(args: fmt::Arguments<'_>) {
    let _ = log(Level::Debug, args);
}

#[track_caller]
pub fn info(args: fmt::Arguments<'_>) {
    let _ = log(Level::Info, args);
}

#[track_caller]
pub fn warn(args: fmt::Arguments<'_>) {
    let _ = log(Level::Warn, args);
}

#[track_caller]
pub fn error(args: fmt::Arguments<'_>) {
    let _ = log(Level::Error, args);
}

#[track_caller]
pub fn fatal(args: fmt::Arguments<'_>) {
    let _ = log(Level::Fatal, args);
}

/// Log at an explicit level, either on the default dispatcher or on a given
/// handle with `logger: <expr>`.
///
/// ```rust,no_run
/// use spoollog::{Level, log};
///
/// log!(Level::Info, "started in {}ms", 12);
///
/// let d = spoollog::Dispatcher::new()?;
/// log!(logger: &d, Level::Warn, "queue at {}%", 90);
/// # Ok::<(), spoollog::Error>(())
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {{
        let _ = $logger.log($level, ::std::format_args!($($arg)+));
    }};
    ($level:expr, $($arg:tt)+) => {{
        let _ = $crate::global::log($level, ::std::format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! trace {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Trace, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Debug, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Info, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Warn, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Error, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Error, $($arg)+) };
}

#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Level::Fatal, $($arg)+)
    };
    ($($arg:tt)+) => { $crate::log!($crate::Level::Fatal, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileWriterConfig, LogConfig};

    // The default is process-wide; keep every step in one test.
    #[test]
    fn test_default_lifecycle() {
        shutdown();
        assert!(!is_initialized());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.log");
        let config = LogConfig::new()
            .with_level("info")
            .with_file_writer(FileWriterConfig::new(path.to_str().unwrap()));

        init(&config).unwrap();
        assert!(is_initialized());
        assert!(matches!(init(&config), Err(Error::Init(_))));

        crate::debug!("hidden");
        crate::info!("visible {}", 1);
        warn(format_args!("free function"));
        shutdown();
        assert!(!is_initialized());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hidden"));
        assert!(content.contains("visible 1"));
        assert!(content.contains("free function"));
        assert!(content.contains("[global.rs:"));

        // A new default is created lazily after shutdown.
        let fresh = handle().unwrap();
        assert!(!fresh.is_closed());
        assert_eq!(fresh.level(), Level::Debug);

        // setup configures the existing default in place.
        let setup_path = dir.path().join("setup.log");
        let config = LogConfig::new()
            .with_level("warning")
            .with_file_writer(FileWriterConfig::new(setup_path.to_str().unwrap()));
        setup(&config).unwrap();
        assert!(Arc::ptr_eq(&fresh, &handle().unwrap()));
        assert_eq!(fresh.level(), Level::Warn);
        crate::info!("below warning");
        crate::error!("after setup");
        drop(fresh);
        shutdown();

        let content = std::fs::read_to_string(&setup_path).unwrap();
        assert!(!content.contains("below warning"));
        assert!(content.contains("after setup"));
    }

    #[test]
    fn test_macro_with_explicit_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explicit.log");
        let d = LogConfig::new()
            .with_level("trace")
            .with_file_writer(FileWriterConfig::new(path.to_str().unwrap()))
            .build()
            .unwrap();

        crate::trace!(logger: &d, "t{}", 0);
        crate::error!(logger: d, "boom");
        // Without a warn log the main file stops at ERROR.
        crate::fatal!(logger: d, "past the ceiling");
        d.shutdown();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[TRACE]"));
        assert!(content.contains("] t0\n"));
        assert!(content.contains("[ERROR]"));
        assert!(content.contains("] boom\n"));
        assert!(!content.contains("[FATAL]"));
        assert!(!content.contains("past the ceiling"));
    }
}
