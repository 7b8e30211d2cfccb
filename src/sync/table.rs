use crate::sync::{SyncRow, Watermark};
use crate::Result;
use async_trait::async_trait;

/// Human-readable `host:port/table` of a table endpoint.
pub trait TableLocation {
    fn location(&self) -> &str;
}

/// The table rows are read from.
#[async_trait]
pub trait SourceTable: TableLocation + Send + Sync {
    /// Number of rows with `date` strictly after `watermark`.
    async fn count_pending(&self, watermark: &Watermark) -> Result<u64>;

    /// Forward-only cursor over rows with `date` strictly after `watermark`.
    async fn pending_rows(&self, watermark: &Watermark) -> Result<Box<dyn RowCursor>>;
}

/// Single-pass sequence of source rows, consumed one at a time.
#[async_trait]
pub trait RowCursor: Send {
    /// Returns `None` once the cursor is exhausted.
    async fn next_row(&mut self) -> Result<Option<SyncRow>>;
}

/// The table rows are written to.
#[async_trait]
pub trait DestinationTable: TableLocation + Send + Sync {
    /// The `date` of the row with the greatest key, `None` when the table is empty.
    async fn latest_synced_date(&self) -> Result<Option<Watermark>>;

    /// Prepares the insert statement once for the whole run.
    async fn prepare_insert(&self) -> Result<Box<dyn RowWriter>>;
}

/// A prepared insert bound to one destination connection.
#[async_trait]
pub trait RowWriter: Send {
    async fn insert(&mut self, row: &SyncRow) -> Result<()>;
}
