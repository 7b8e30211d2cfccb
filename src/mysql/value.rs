//! Decoding MySQL column values into sync types.
//!
//! Values arrive as text (`Bytes`) over the text protocol and as typed
//! values over the binary protocol, so both shapes are accepted.

use crate::sync::{SyncRow, Watermark};
use crate::{Error, Result};
use chrono::NaiveDate;
use mysql_async::{Row, Value};

/// Decodes a `date` column into a watermark. `NULL` is rejected.
pub fn value_to_watermark(value: Value) -> Result<Watermark> {
    match value {
        Value::NULL => Err(Error::invalid_value("date is NULL")),
        Value::Bytes(bytes) => {
            let text = String::from_utf8(bytes)
                .map_err(|e| Error::invalid_value(format!("date is not UTF-8: {}", e)))?;
            text.parse()
        }
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .and_then(|date| {
                    date.and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
                })
                .map(Watermark::new)
                .ok_or_else(|| {
                    Error::invalid_value(format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} is not a valid date",
                        year, month, day, hour, minute, second
                    ))
                })
        }
        other => Err(Error::invalid_value(format!(
            "unsupported date value: {:?}",
            other
        ))),
    }
}

/// Renders the `tk` column as text, whether it is stored as a string or a number.
pub fn value_to_key(value: Value) -> Result<String> {
    match value {
        Value::Bytes(bytes) => String::from_utf8(bytes)
            .map_err(|e| Error::invalid_value(format!("tk is not UTF-8: {}", e))),
        Value::Int(n) => Ok(n.to_string()),
        Value::UInt(n) => Ok(n.to_string()),
        Value::NULL => Err(Error::invalid_value("tk is NULL")),
        other => Err(Error::invalid_value(format!(
            "unsupported tk value: {:?}",
            other
        ))),
    }
}

/// Decodes a non-NULL text column.
pub fn value_to_text(column: &str, value: Value) -> Result<String> {
    match value {
        Value::Bytes(bytes) => String::from_utf8(bytes)
            .map_err(|e| Error::invalid_value(format!("{} is not UTF-8: {}", column, e))),
        Value::NULL => Err(Error::invalid_value(format!("{} is NULL", column))),
        other => Err(Error::invalid_value(format!(
            "unsupported {} value: {:?}",
            column, other
        ))),
    }
}

/// Decodes a `(tk, name, department)` row.
pub fn row_to_sync_row(mut row: Row) -> Result<SyncRow> {
    let mut column = |index: usize, name: &str| {
        row.take::<Value, _>(index)
            .ok_or_else(|| Error::invalid_value(format!("missing column {}", name)))
    };

    let key = column(0, "tk")?;
    let name = column(1, "name")?;
    let department = column(2, "department")?;

    Ok(SyncRow {
        key: value_to_key(key)?,
        name: value_to_text("name", name)?,
        department: value_to_text("department", department)?,
    })
}
