//! Origin resolution for ingest requests.
//!
//! The forwarding header is taken at face value: any client can set it, so
//! the resolved origin is best-effort log metadata and never an identity.

use axum::http::HeaderMap;
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    /// First hop claimed by `x-forwarded-for`. Unverified.
    Forwarded(String),
    /// Address of the TCP peer.
    Peer(IpAddr),
    /// No header and no connection info (e.g. in-process requests).
    Unknown,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Forwarded(addr) => f.write_str(addr),
            Origin::Peer(ip) => write!(f, "{ip}"),
            Origin::Unknown => f.write_str("unknown"),
        }
    }
}

/// Prefers the first comma-separated token of `x-forwarded-for`; falls back
/// to the peer address when the header is absent or blank. Non-ASCII bytes
/// are decoded lossily, the same way the header dump renders them.
pub fn resolve_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> Origin {
    let raw = headers
        .get(FORWARDED_FOR)
        .map(|value| String::from_utf8_lossy(value.as_bytes()));
    let forwarded = raw
        .as_deref()
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    match (forwarded, peer) {
        (Some(hop), _) => Origin::Forwarded(hop.to_string()),
        (None, Some(addr)) => Origin::Peer(addr.ip()),
        (None, None) => Origin::Unknown,
    }
}
