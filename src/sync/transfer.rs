//! Counting and copying pending rows from source to destination.

use crate::sync::table::{DestinationTable, RowWriter, SourceTable};
use crate::sync::watermark::resolve_watermark;
use crate::sync::Watermark;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// What a completed sync pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub watermark: Watermark,
    /// Rows the count query reported before the transfer started.
    pub counted: u64,
    /// Rows actually inserted into the destination.
    pub transferred: u64,
}

/// Counts source rows newer than `watermark`. Used for reporting only.
pub async fn count_pending(source: &dyn SourceTable, watermark: &Watermark) -> Result<u64> {
    let count = source
        .count_pending(watermark)
        .await
        .map_err(|e| Error::SourceQuery {
            endpoint: source.location().to_string(),
            source: Box::new(e),
        })?;

    info!(
        endpoint = %source.location(),
        "Counted {} rows, starting sync...", count
    );
    Ok(count)
}

/// Copies every source row newer than `watermark` into the destination,
/// in cursor order, and returns how many were inserted.
///
/// The first failure stops the transfer. Rows inserted before it stay in
/// the destination; nothing is rolled back. Running twice with the same
/// watermark inserts the same rows twice.
pub async fn transfer(
    source: &dyn SourceTable,
    destination: &dyn DestinationTable,
    watermark: &Watermark,
) -> Result<u64> {
    let mut cursor = source
        .pending_rows(watermark)
        .await
        .map_err(|e| Error::SourceQuery {
            endpoint: source.location().to_string(),
            source: Box::new(e),
        })?;

    // Prepared on the first row so an empty run never touches the destination.
    let mut writer: Option<Box<dyn RowWriter>> = None;

    let mut transferred = 0u64;
    loop {
        let position = transferred + 1;

        let row = match cursor.next_row().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => {
                return Err(Error::RowTransfer {
                    endpoint: source.location().to_string(),
                    position,
                    source: Box::new(e),
                })
            }
        };

        let writer = match &mut writer {
            Some(writer) => writer,
            empty => {
                let prepared = destination.prepare_insert().await.map_err(|e| {
                    Error::RowTransfer {
                        endpoint: destination.location().to_string(),
                        position,
                        source: Box::new(e),
                    }
                })?;
                empty.insert(prepared)
            }
        };

        writer.insert(&row).await.map_err(|e| Error::RowTransfer {
            endpoint: destination.location().to_string(),
            position,
            source: Box::new(e),
        })?;

        debug!(key = %row.key, position, "Inserted row");
        transferred = position;
    }

    Ok(transferred)
}

/// One watermark-resolve, count and transfer pass between two tables.
pub struct Synchronizer<'a> {
    source: &'a dyn SourceTable,
    destination: &'a dyn DestinationTable,
    default_watermark: Watermark,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        source: &'a dyn SourceTable,
        destination: &'a dyn DestinationTable,
        default_watermark: Watermark,
    ) -> Self {
        Self {
            source,
            destination,
            default_watermark,
        }
    }

    pub async fn sync(&self) -> Result<SyncOutcome> {
        let watermark = resolve_watermark(self.destination, self.default_watermark).await?;
        let counted = count_pending(self.source, &watermark).await?;
        let transferred = transfer(self.source, self.destination, &watermark).await?;

        if transferred != counted {
            warn!(
                counted,
                transferred,
                "Inserted row count differs from the counted rows"
            );
        }

        info!(
            "{} -> {} : Inserted {} new rows since last sync",
            self.source.location(),
            self.destination.location(),
            transferred
        );

        Ok(SyncOutcome {
            watermark,
            counted,
            transferred,
        })
    }
}
