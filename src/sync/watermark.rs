//! The watermark separating already-synced rows from pending ones.

use crate::sync::table::DestinationTable;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Cutoff used when the destination table is still empty.
pub const DEFAULT_WATERMARK: &str = "2020-09-12 00:00:00";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATETIME_FRACTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A point in time; source rows with `date` strictly after it are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(NaiveDateTime);

impl Watermark {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }
}

impl Default for Watermark {
    fn default() -> Self {
        let at = NaiveDateTime::parse_from_str(DEFAULT_WATERMARK, DATETIME_FORMAT)
            .unwrap_or_default();
        Self(at)
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.nanosecond() == 0 {
            write!(f, "{}", self.0.format(DATETIME_FORMAT))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.6f"))
        }
    }
}

impl FromStr for Watermark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, DATETIME_FRACTION_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT))
            .or_else(|_| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
            })
            .map(Watermark)
            .map_err(|e| Error::invalid_value(format!("'{}' is not a timestamp: {}", s, e)))
    }
}

impl<'de> Deserialize<'de> for Watermark {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Determines the cutoff for this run from the destination table.
///
/// The latest row is the one with the greatest key, not the greatest date,
/// so this assumes keys grow with time. An empty destination yields
/// `default`.
pub async fn resolve_watermark(
    destination: &dyn DestinationTable,
    default: Watermark,
) -> Result<Watermark> {
    let latest = destination
        .latest_synced_date()
        .await
        .map_err(|e| Error::Watermark {
            endpoint: destination.location().to_string(),
            source: Box::new(e),
        })?;

    match latest {
        Some(watermark) => {
            info!(
                endpoint = %destination.location(),
                "Last sync date is '{}'", watermark
            );
            Ok(watermark)
        }
        None => {
            info!(
                endpoint = %destination.location(),
                "No date found, defaulting to '{}' as last sync date", default
            );
            Ok(default)
        }
    }
}
