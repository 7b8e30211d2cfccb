//! Error types and result handling for mysql-sync.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! Every variant except [`Error::Notification`] is fatal: the run stops at
//! the first one and the process exits with a non-zero status.
//!
//! # Example
//!
//! ```rust
//! use mysql_sync::{Error, Result};
//!
//! fn send_report() -> Result<()> {
//!     Err(Error::Notification("relay unreachable".to_string()))
//! }
//!
//! match send_report() {
//!     Ok(()) => println!("Sent"),
//!     Err(e) if !e.is_fatal() => eprintln!("Ignoring: {}", e),
//!     Err(e) => eprintln!("Fatal: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for mysql-sync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file missing, unparseable or holding an invalid value.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// MySQL client or protocol error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// I/O error, typically from log file handling.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A column value could not be decoded into the expected type.
    #[error("Invalid value: {message}")]
    InvalidValue {
        /// Description of what was invalid
        message: String,
    },

    /// Opening a pool or the liveness probe failed for an endpoint.
    #[error("{endpoint}: MySQL connectivity test failed: {source}")]
    Connectivity {
        /// `host:port` of the endpoint
        endpoint: String,
        #[source]
        source: Box<Error>,
    },

    /// Reading the last sync date from the destination failed.
    ///
    /// An empty destination is not an error; it selects the default watermark.
    #[error("{endpoint}: Failed retrieving last sync date: {source}")]
    Watermark {
        /// `host:port/table` of the destination
        endpoint: String,
        #[source]
        source: Box<Error>,
    },

    /// Counting or selecting pending rows on the source failed.
    #[error("{endpoint}: Failed to query pending rows: {source}")]
    SourceQuery {
        /// `host:port/table` of the source
        endpoint: String,
        #[source]
        source: Box<Error>,
    },

    /// Decoding or inserting a single row failed. Rows before it remain inserted.
    #[error("{endpoint}: Failed to transfer row #{position}: {source}")]
    RowTransfer {
        /// `host:port/table` of the side that failed
        endpoint: String,
        /// 1-based position of the row in the source cursor
        position: u64,
        #[source]
        source: Box<Error>,
    },

    /// Sending the completion email failed.
    #[error("Notification error: {0}")]
    Notification(String),
}

impl Error {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Error::InvalidValue {
            message: message.into(),
        }
    }

    /// Whether this error terminates the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Notification(_))
    }
}

/// A convenient Result type alias for mysql-sync operations.
pub type Result<T> = std::result::Result<T, Error>;
