//! Logging setup

use crate::error::Result;
use std::fmt;
use std::fs::File;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Route `tracing` output to `output_path`, or to stdout when none is given.
///
/// A subscriber installed earlier in the process is left in place.
pub fn setup_output(output_path: Option<&String>) -> Result<()> {
    let installed = match output_path {
        Some(path) => {
            let log = File::create(path)?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default().with(file_layer).try_init().is_ok()
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).try_init().is_ok()
        }
    };
    if installed {
        match output_path {
            Some(path) => info!("Output will be written to: {}", path),
            None => info!("Output will be printed to stdout"),
        }
    }
    Ok(())
}
