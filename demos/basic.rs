use spoollog::{Level, LogBuilder};

fn main() -> Result<(), spoollog::Error> {
    let logger = LogBuilder::new()
        .with_level("trace")
        .with_color_console()
        .init()?;

    for level in Level::ALL {
        spoollog::log!(logger: &logger, level, "a {} message", level.config_name());
    }

    logger.shutdown();
    Ok(())
}
