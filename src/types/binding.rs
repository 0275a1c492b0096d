//! Server bindings and `address:port` extraction.

use super::AddressLiteral;
use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use std::fmt;

/// Where a server listens: a validated address and port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServerBinding {
    pub address: AddressLiteral,
    pub port: u16,
}

impl ServerBinding {
    /// Create a new binding.
    pub const fn new(address: AddressLiteral, port: u16) -> Self {
        Self { address, port }
    }

    /// Parse an `address:port` or `[ipv6]:port` string.
    pub fn parse(s: &str) -> ConfigResult<Self> {
        let (address, port) = split_host_port(s)?;
        Ok(Self::new(address, port))
    }
}

impl fmt::Display for ServerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address.host(), self.port)
    }
}

/// Split a trailing `:port` from an address.
///
/// A bracket-wrapped remainder must be an IPv6 literal. Otherwise the
/// remainder is split at the last colon and parsed as IPv4, then IPv6.
pub fn split_host_port(s: &str) -> ConfigResult<(AddressLiteral, u16)> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix('[') {
        let (inner, tail) = rest
            .split_once(']')
            .ok_or_else(|| ConfigError::InvalidAddress(s.to_string()))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| ConfigError::InvalidPort(tail.to_string()))?;
        let address = AddressLiteral::parse_v6(inner)?;
        return Ok((address, parse_port(port)?));
    }

    let (host, port) = s
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::InvalidPort(s.to_string()))?;
    let address = AddressLiteral::parse(host)?;
    Ok((address, parse_port(port)?))
}

/// Parse a decimal port number in `0..=65535`.
pub fn parse_port(s: &str) -> ConfigResult<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidPort(s.to_string()));
    }
    s.parse().map_err(|_| ConfigError::InvalidPort(s.to_string()))
}
