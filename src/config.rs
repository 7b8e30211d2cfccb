use crate::sync::Watermark;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Immutable run configuration, loaded once at startup and passed down
/// explicitly.
///
/// Missing keys read as empty strings or zero; nothing is validated here
/// beyond what deserialization requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: EndpointConfig,
    #[serde(default)]
    pub destination: EndpointConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db: String,
    #[serde(rename = "tbl1")]
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Used when the destination table holds no rows yet.
    pub default_watermark: Watermark,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: usize,
    pub max_lifetime_secs: u64,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("MYSQL_SYNC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl EndpointConfig {
    /// `host:port`, used to tag connectivity log lines.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:port/table`, used in log lines and the report email.
    pub fn location(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.table)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: Vec::new(),
            subject: String::new(),
            host: String::new(),
            port: 0,
            user: String::new(),
            password: String::new(),
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_watermark: Watermark::default(),
            log_file: PathBuf::from(default_log_file()),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_lifetime_secs: default_max_lifetime_secs(),
        }
    }
}

fn default_mail_timeout_secs() -> u64 {
    30
}

fn default_log_file() -> &'static str {
    "mysqlsync.log"
}

fn default_max_connections() -> usize {
    10
}

fn default_max_lifetime_secs() -> u64 {
    180 // 3 minutes
}
