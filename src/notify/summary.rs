use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

/// Everything the completion email reports about one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub hostname: String,
    pub rows_synced: u64,
    pub source: String,
    pub destination: String,
    pub log_file: PathBuf,
    pub config_file: PathBuf,
}

impl RunSummary {
    pub fn body(&self) -> String {
        format!(
            "MySQL sync completed successfully in {:?} on server {}.\n\
             {} rows synced from {} to {}.\n\
             Log file located at {}:{}\n\
             To change the email settings please edit {}:{}",
            self.elapsed,
            self.hostname,
            self.rows_synced,
            self.source,
            self.destination,
            self.hostname,
            self.log_file.display(),
            self.hostname,
            self.config_file.display(),
        )
    }
}

/// The machine's hostname, or `unknown` if it cannot be read.
pub fn local_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            error!(error = %e, "Unable to retrieve hostname, defaulting to 'unknown'");
            "unknown".to_string()
        }
    }
}
