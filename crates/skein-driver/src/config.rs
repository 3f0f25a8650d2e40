//! Driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection configuration for a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Username for authentication.
    pub username: Option<String>,
    /// Password for authentication.
    pub password: Option<String>,
    /// Database name.
    pub database: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Simulated completion latency for asynchronously submitted statements.
    ///
    /// Only honored by the in-memory reference driver; a wire driver's
    /// completion times come from the server.
    pub async_latency: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            username: None,
            password: None,
            database: "skein".to_string(),
            connect_timeout: Duration::from_secs(10),
            async_latency: Duration::from_millis(2),
        }
    }
}

impl DriverConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the simulated async completion latency.
    pub fn async_latency(mut self, latency: Duration) -> Self {
        self.async_latency = latency;
        self
    }

    /// Returns the connection string.
    pub fn connection_string(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }

    /// Creates a configuration tuned for tests: minimal async latency.
    pub fn for_testing() -> Self {
        Self::default().async_latency(Duration::from_millis(1))
    }
}
