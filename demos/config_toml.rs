//! Load logging configuration from a TOML file into the process-wide default.
//!
//! Run with:
//! ```bash
//! cargo run --example config_toml
//! ```

use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = "demos/config.toml";
    let content = fs::read_to_string(config_path)?;
    let config: spoollog::LogConfig = toml::from_str(&content)?;

    spoollog::global::init(&config)?;

    spoollog::trace!("This is a trace message (not visible at debug)");
    spoollog::debug!("This is a debug message");
    spoollog::info!("This is an info message");
    spoollog::warn!("This goes to demo.wf.log, not demo.log");
    spoollog::error!("So does this error");

    spoollog::global::shutdown();
    Ok(())
}
