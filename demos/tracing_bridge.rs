use std::sync::Arc;

fn main() -> Result<(), spoollog::Error> {
    let logger = Arc::new(spoollog::builder().with_level("info").with_console(true).init()?);
    spoollog::init_tracing(logger.clone())?;

    tracing::info!(user = "bob", action = "login", "User logged in");
    tracing::debug!("dropped by the dispatcher level floor");
    tracing::error!(code = 500, "Database error occurred");

    logger.shutdown();
    Ok(())
}
