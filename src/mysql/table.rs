//! The fixed `(tk, name, department, date)` table shape on MySQL.

use crate::mysql::connection::MySqlEndpoint;
use crate::mysql::value::{row_to_sync_row, value_to_watermark};
use crate::sync::table::{DestinationTable, RowCursor, RowWriter, SourceTable, TableLocation};
use crate::sync::{SyncRow, Watermark};
use crate::{Error, Result};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{BinaryProtocol, Conn, QueryResult, Row, Statement, Value};
use tracing::debug;

impl MySqlEndpoint {
    fn latest_date_query(&self) -> String {
        format!(
            "SELECT date FROM {} ORDER BY tk DESC LIMIT 1",
            self.qualified_table()
        )
    }

    fn count_query(&self) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE date > ?", self.qualified_table())
    }

    fn select_query(&self) -> String {
        format!(
            "SELECT tk, name, department FROM {} WHERE date > ?",
            self.qualified_table()
        )
    }

    fn insert_query(&self) -> String {
        format!(
            "INSERT INTO {} (tk, name, department) VALUES (?, ?, ?)",
            self.qualified_table()
        )
    }
}

#[async_trait]
impl SourceTable for MySqlEndpoint {
    async fn count_pending(&self, watermark: &Watermark) -> Result<u64> {
        let mut conn = self.pool().get_conn().await?;
        let count: Option<u64> = conn
            .exec_first(self.count_query(), (watermark.to_string(),))
            .await?;
        Ok(count.unwrap_or(0))
    }

    async fn pending_rows(&self, watermark: &Watermark) -> Result<Box<dyn RowCursor>> {
        let conn = self.pool().get_conn().await?;
        debug!(endpoint = %self.location(), watermark = %watermark, "Opening source cursor");
        let result = self
            .select_query()
            .with((watermark.to_string(),))
            .run(conn)
            .await?;
        Ok(Box::new(MySqlCursor { result }))
    }
}

/// Streams rows off an open result set on a connection it owns.
struct MySqlCursor {
    result: QueryResult<'static, 'static, BinaryProtocol>,
}

#[async_trait]
impl RowCursor for MySqlCursor {
    async fn next_row(&mut self) -> Result<Option<SyncRow>> {
        match self.result.next().await? {
            Some(row) => row_to_sync_row(row).map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DestinationTable for MySqlEndpoint {
    async fn latest_synced_date(&self) -> Result<Option<Watermark>> {
        let mut conn = self.pool().get_conn().await?;
        let row: Option<Row> = conn.query_first(self.latest_date_query()).await?;
        match row {
            None => Ok(None),
            Some(mut row) => {
                let date = row
                    .take::<Value, _>(0)
                    .ok_or_else(|| Error::invalid_value("missing column date"))?;
                value_to_watermark(date).map(Some)
            }
        }
    }

    async fn prepare_insert(&self) -> Result<Box<dyn RowWriter>> {
        let mut conn = self.pool().get_conn().await?;
        let statement = conn.prep(self.insert_query()).await?;
        Ok(Box::new(MySqlInserter { conn, statement }))
    }
}

/// An insert statement prepared once and executed per row.
struct MySqlInserter {
    conn: Conn,
    statement: Statement,
}

#[async_trait]
impl RowWriter for MySqlInserter {
    async fn insert(&mut self, row: &SyncRow) -> Result<()> {
        self.conn
            .exec_drop(
                &self.statement,
                (row.key.clone(), row.name.clone(), row.department.clone()),
            )
            .await?;
        Ok(())
    }
}
