//! Completion report sent after a successful sync.

pub mod smtp;
pub mod summary;

pub use smtp::SmtpNotifier;
pub use summary::{local_hostname, RunSummary};

use crate::Result;
use async_trait::async_trait;

/// Delivers the run report. Failures are reported but never abort a run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &RunSummary) -> Result<()>;

    /// Who the report goes to, for logging.
    fn recipients(&self) -> Vec<String>;
}
