pub mod config;
pub mod error;
pub mod runner;

pub mod mysql;
pub mod notify;
pub mod sync;

pub use config::Config;
pub use error::{Error, Result};
pub use runner::SyncRunner;
