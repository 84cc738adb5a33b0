use crate::error::{PipelineError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, Level};

/// Install the global fmt subscriber. `INFO` by default, `DEBUG` when verbose.
/// With a log file the output goes there without ANSI colours instead of stderr.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| PipelineError::Config(format!("failed to initialise logging: {}", e)))?;
    debug!("Logging initialised at {}", level);
    Ok(())
}
