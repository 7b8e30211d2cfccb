//! Incremental, watermark-driven row synchronization.
//!
//! The engine only talks to the [`SourceTable`] and [`DestinationTable`]
//! traits; the MySQL implementations live in [`crate::mysql`].

pub mod row;
pub mod table;
pub mod transfer;
pub mod watermark;

#[cfg(test)]
pub(crate) mod test_utils;

pub use row::SyncRow;
pub use table::{DestinationTable, RowCursor, RowWriter, SourceTable, TableLocation};
pub use transfer::{count_pending, transfer, SyncOutcome, Synchronizer};
pub use watermark::{resolve_watermark, Watermark, DEFAULT_WATERMARK};
