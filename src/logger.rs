use std::path::Path;

use anyhow::{Context, Result};

use crate::config::LoggingConfig;

/// Sends `log` records to `<dir>/taskflow.log` when logging is enabled.
///
/// Does nothing when disabled. Only the first call installs a logger.
pub fn init(config: &LoggingConfig, dir: &Path) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }
    let level = config.level_filter()?;
    let path = dir.join("taskflow.log");
    let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(file)
        .apply()
        .context("Logger already initialised")?;
    Ok(())
}
