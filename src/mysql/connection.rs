use crate::config::{EndpointConfig, PoolConfig};
use crate::sync::TableLocation;
use crate::{Error, Result};
use mysql_async::prelude::*;
use mysql_async::{OptsBuilder, Pool, PoolConstraints, PoolOpts};
use std::time::Duration;
use tracing::{error, info};

/// A pooled connection to one MySQL server and the table synced on it.
pub struct MySqlEndpoint {
    pool: Pool,
    database: String,
    table: String,
    address: String,
    location: String,
}

impl MySqlEndpoint {
    /// Builds the connection pool. No connection is opened until [`verify`](Self::verify).
    pub fn connect(endpoint: &EndpointConfig, pool: &PoolConfig) -> Result<Self> {
        if pool.max_connections == 0 {
            return Err(Error::Config(config::ConfigError::Message(
                "pool.max_connections must be at least 1".to_string(),
            )));
        }

        let constraints = PoolConstraints::new(0, pool.max_connections).ok_or_else(|| {
            Error::Config(config::ConfigError::Message(format!(
                "invalid pool size {}",
                pool.max_connections
            )))
        })?;

        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_abs_conn_ttl(Some(Duration::from_secs(pool.max_lifetime_secs)));

        let opts = OptsBuilder::default()
            .ip_or_hostname(endpoint.host.clone())
            .tcp_port(endpoint.port)
            .user(Some(endpoint.username.clone()))
            .pass(Some(endpoint.password.clone()))
            .db_name(Some(endpoint.db.clone()))
            .pool_opts(pool_opts);

        Ok(Self {
            pool: Pool::new(opts),
            database: endpoint.db.clone(),
            table: endpoint.table.clone(),
            address: endpoint.address(),
            location: endpoint.location(),
        })
    }

    /// Opens a connection and pings the server.
    ///
    /// A failure is returned, not logged; the caller reports it once.
    pub async fn verify(&self) -> Result<()> {
        self.ping().await.map_err(|e| Error::Connectivity {
            endpoint: self.address.clone(),
            source: Box::new(e),
        })?;

        info!(endpoint = %self.address, "MySQL connectivity test passed");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.ping().await?;
        Ok(())
    }

    pub async fn disconnect(self) {
        if let Err(e) = self.pool.disconnect().await {
            error!(endpoint = %self.address, error = %e, "Failed to close connection pool");
        }
    }

    pub(crate) fn pool(&self) -> &Pool {
        &self.pool
    }

    /// `` `db`.`table` `` with identifiers quoted.
    pub fn qualified_table(&self) -> String {
        if self.database.is_empty() {
            quote_identifier(&self.table)
        } else {
            format!(
                "{}.{}",
                quote_identifier(&self.database),
                quote_identifier(&self.table)
            )
        }
    }
}

impl TableLocation for MySqlEndpoint {
    fn location(&self) -> &str {
        &self.location
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
