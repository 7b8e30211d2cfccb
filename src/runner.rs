use crate::mysql::MySqlEndpoint;
use crate::notify::{local_hostname, Notifier, RunSummary, SmtpNotifier};
use crate::sync::{DestinationTable, SourceTable, Synchronizer};
use crate::{Config, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Runs one complete sync: connect, verify, transfer, report.
pub struct SyncRunner {
    config: Config,
    config_file: PathBuf,
    log_file: PathBuf,
}

impl SyncRunner {
    pub fn new(config: Config, config_file: impl Into<PathBuf>) -> Self {
        let log_file = config.sync.log_file.clone();
        Self {
            config,
            config_file: config_file.into(),
            log_file,
        }
    }

    /// Overrides the log file path reported in the email.
    pub fn with_log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = log_file.into();
        self
    }

    /// Connects both endpoints and syncs. Both pools are closed before
    /// returning, whatever the outcome.
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        info!("Starting MySQL sync, hang on to your helmets...");

        let source = MySqlEndpoint::connect(&self.config.source, &self.config.pool)?;
        let destination = match MySqlEndpoint::connect(&self.config.destination, &self.config.pool)
        {
            Ok(destination) => destination,
            Err(e) => {
                source.disconnect().await;
                return Err(e);
            }
        };

        let notifier = SmtpNotifier::new(self.config.mail.clone());
        let result = self
            .run_connected(&source, &destination, &notifier, started)
            .await;

        source.disconnect().await;
        destination.disconnect().await;

        result
    }

    async fn run_connected(
        &self,
        source: &MySqlEndpoint,
        destination: &MySqlEndpoint,
        notifier: &dyn Notifier,
        started: Instant,
    ) -> Result<RunSummary> {
        source.verify().await?;
        destination.verify().await?;

        self.execute(source, destination, notifier, started).await
    }

    /// Syncs between already verified tables, then sends the report.
    ///
    /// A failed report is logged and does not fail the run.
    pub async fn execute(
        &self,
        source: &dyn SourceTable,
        destination: &dyn DestinationTable,
        notifier: &dyn Notifier,
        started: Instant,
    ) -> Result<RunSummary> {
        let outcome = Synchronizer::new(source, destination, self.config.sync.default_watermark)
            .sync()
            .await?;

        let summary = RunSummary {
            elapsed: started.elapsed(),
            hostname: local_hostname(),
            rows_synced: outcome.transferred,
            source: source.location().to_string(),
            destination: destination.location().to_string(),
            log_file: absolute(&self.log_file),
            config_file: absolute(&self.config_file),
        };

        match notifier.notify(&summary).await {
            Ok(()) => info!(recipients = ?notifier.recipients(), "Notification email sent"),
            Err(e) => error!(error = %e, "Unable to send notification email"),
        }

        info!(
            "MySQL sync completed successfully in {:?}",
            summary.elapsed
        );
        Ok(summary)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
