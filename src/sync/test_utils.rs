//! In-memory tables for exercising the sync engine without a database.

use crate::sync::table::{DestinationTable, RowCursor, RowWriter, SourceTable, TableLocation};
use crate::sync::{SyncRow, Watermark};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn at(s: &str) -> Watermark {
    s.parse().unwrap()
}

/// Source rows with their `date` column, in table order.
pub struct MemorySource {
    location: String,
    rows: Vec<(SyncRow, Option<Watermark>)>,
    pub fail_count: bool,
    pub fail_select: bool,
    /// 1-based cursor position that fails to decode.
    pub fail_decode_at: Option<u64>,
    pub queries: AtomicUsize,
}

impl MemorySource {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            rows: Vec::new(),
            fail_count: false,
            fail_select: false,
            fail_decode_at: None,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn with_row(mut self, key: &str, name: &str, department: &str, date: &str) -> Self {
        self.rows
            .push((SyncRow::new(key, name, department), Some(at(date))));
        self
    }

    pub fn with_undated_row(mut self, key: &str, name: &str, department: &str) -> Self {
        self.rows.push((SyncRow::new(key, name, department), None));
        self
    }

    fn pending(&self, watermark: &Watermark) -> Vec<SyncRow> {
        // SQL `NULL > x` is not true, so undated rows never qualify.
        self.rows
            .iter()
            .filter(|(_, date)| matches!(date, Some(d) if d > watermark))
            .map(|(row, _)| row.clone())
            .collect()
    }
}

impl TableLocation for MemorySource {
    fn location(&self) -> &str {
        &self.location
    }
}

#[async_trait]
impl SourceTable for MemorySource {
    async fn count_pending(&self, watermark: &Watermark) -> Result<u64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_count {
            return Err(Error::invalid_value("count query rejected"));
        }
        Ok(self.pending(watermark).len() as u64)
    }

    async fn pending_rows(&self, watermark: &Watermark) -> Result<Box<dyn RowCursor>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_select {
            return Err(Error::invalid_value("select rejected"));
        }
        Ok(Box::new(MemoryCursor {
            rows: self.pending(watermark).into(),
            position: 0,
            fail_decode_at: self.fail_decode_at,
        }))
    }
}

struct MemoryCursor {
    rows: VecDeque<SyncRow>,
    position: u64,
    fail_decode_at: Option<u64>,
}

#[async_trait]
impl RowCursor for MemoryCursor {
    async fn next_row(&mut self) -> Result<Option<SyncRow>> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(None);
        };
        self.position += 1;
        if self.fail_decode_at == Some(self.position) {
            return Err(Error::invalid_value("NULL name"));
        }
        Ok(Some(row))
    }
}

/// A stored destination row; `date` is what the table default assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub row: SyncRow,
    pub date: Option<Watermark>,
}

/// Destination table. Inserted rows get `insert_date` as their `date`,
/// standing in for a column default.
#[derive(Clone)]
pub struct MemoryDestination {
    location: String,
    pub rows: Arc<Mutex<Vec<StoredRow>>>,
    pub insert_date: Option<Watermark>,
    pub fail_latest: bool,
    pub fail_prepare: bool,
    /// 1-based insert call that fails.
    pub fail_insert_at: Option<usize>,
    pub prepares: Arc<AtomicUsize>,
    inserts: Arc<AtomicUsize>,
}

impl MemoryDestination {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            rows: Arc::new(Mutex::new(Vec::new())),
            insert_date: Some(at("2030-01-01 00:00:00")),
            fail_latest: false,
            fail_prepare: false,
            fail_insert_at: None,
            prepares: Arc::new(AtomicUsize::new(0)),
            inserts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_row(self, key: &str, name: &str, department: &str, date: &str) -> Self {
        self.rows.lock().unwrap().push(StoredRow {
            row: SyncRow::new(key, name, department),
            date: Some(at(date)),
        });
        self
    }

    pub fn with_undated_row(self, key: &str, name: &str, department: &str) -> Self {
        self.rows.lock().unwrap().push(StoredRow {
            row: SyncRow::new(key, name, department),
            date: None,
        });
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|stored| stored.row.key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl TableLocation for MemoryDestination {
    fn location(&self) -> &str {
        &self.location
    }
}

/// Orders keys numerically when both parse, mirroring an integer `tk` column.
fn key_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[async_trait]
impl DestinationTable for MemoryDestination {
    async fn latest_synced_date(&self) -> Result<Option<Watermark>> {
        if self.fail_latest {
            return Err(Error::invalid_value("table does not exist"));
        }
        let rows = self.rows.lock().unwrap();
        match rows.iter().max_by(|a, b| key_order(&a.row.key, &b.row.key)) {
            None => Ok(None),
            Some(stored) => stored
                .date
                .map(Some)
                .ok_or_else(|| Error::invalid_value("NULL date")),
        }
    }

    async fn prepare_insert(&self) -> Result<Box<dyn RowWriter>> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        if self.fail_prepare {
            return Err(Error::invalid_value("unknown column 'department'"));
        }
        Ok(Box::new(MemoryWriter {
            table: self.clone(),
        }))
    }
}

struct MemoryWriter {
    table: MemoryDestination,
}

#[async_trait]
impl RowWriter for MemoryWriter {
    async fn insert(&mut self, row: &SyncRow) -> Result<()> {
        let call = self.table.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.table.fail_insert_at == Some(call) {
            return Err(Error::invalid_value("duplicate entry"));
        }
        self.table.rows.lock().unwrap().push(StoredRow {
            row: row.clone(),
            date: self.table.insert_date,
        });
        Ok(())
    }
}
