use gsm_common::{env_list, env_or};
use std::net::{IpAddr, Ipv4Addr};

use crate::record::{LogPolicy, PayloadLogMode};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 256 * 1024;

/// Everything the server needs, read once at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub body_limit_bytes: usize,
    pub log_policy: LogPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            log_policy: LogPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Only the port and the log policy come from the environment; the
    /// listen address and body ceiling are fixed. Unset or unparseable
    /// variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            log_policy: LogPolicy::new(
                env_or("INGEST_LOG_PAYLOAD", PayloadLogMode::Full),
                env_list("INGEST_REDACT_HEADERS"),
            ),
            ..defaults
        }
    }
}
