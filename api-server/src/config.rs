use std::fmt;
use std::net::{AddrParseError, IpAddr, SocketAddr};

use serde::Deserialize;

/// Reported when `NODE_ENV` is absent or empty.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Configuration loaded from environment variables.
///
/// Read once at startup and shared read-only by every request.
#[derive(Deserialize, Clone)]
pub struct Config {
    /// Bind address (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Hosting target reported in every response body
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Deployment environment name
    #[serde(default)]
    pub node_env: Option<String>,

    /// Only checked for presence
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Only checked for presence
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Log level used when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_platform() -> String {
    "Railway".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Variable names are the uppercased field names: `PORT`, `NODE_ENV`, ...
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    /// Environment name, falling back to "production".
    pub fn environment(&self) -> &str {
        non_empty(&self.node_env).unwrap_or(DEFAULT_ENVIRONMENT)
    }

    pub fn supabase_connected(&self) -> bool {
        non_empty(&self.supabase_url).is_some()
    }

    pub fn jwt_configured(&self) -> bool {
        non_empty(&self.jwt_secret).is_some()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            platform: default_platform(),
            node_env: None,
            supabase_url: None,
            jwt_secret: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// Secrets are reported as set/unset only.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("platform", &self.platform)
            .field("environment", &self.environment())
            .field("supabase_connected", &self.supabase_connected())
            .field("jwt_configured", &self.jwt_configured())
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
