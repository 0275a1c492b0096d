//! Validated address literals.
//!
//! `AddressLiteral` only ever holds a syntactically valid IPv4 or IPv6
//! address. Hostnames are rejected; server configs name the interface a
//! server binds to, and that is always a literal.

use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IPv4 or IPv6 address literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum AddressLiteral {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl AddressLiteral {
    /// Parse a literal, trying dotted-quad IPv4 first and then IPv6.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        if let Ok(v4) = s.parse::<Ipv4Addr>() {
            return Ok(Self::V4(v4));
        }
        s.parse::<Ipv6Addr>()
            .map(Self::V6)
            .map_err(|_| ConfigError::InvalidAddress(s.to_string()))
    }

    /// Parse an IPv6 literal only. Used for the inside of `[...]`.
    pub fn parse_v6(s: &str) -> Result<Self, ConfigError> {
        s.parse::<Ipv6Addr>()
            .map(Self::V6)
            .map_err(|_| ConfigError::InvalidAddress(s.to_string()))
    }

    /// Check if this is the "all interfaces" address (`0.0.0.0` or `::`).
    pub fn is_unspecified(&self) -> bool {
        match self {
            Self::V4(ip) => ip.is_unspecified(),
            Self::V6(ip) => ip.is_unspecified(),
        }
    }

    /// The loopback address of the same family.
    pub fn loopback(&self) -> Self {
        match self {
            Self::V4(_) => Self::V4(Ipv4Addr::LOCALHOST),
            Self::V6(_) => Self::V6(Ipv6Addr::LOCALHOST),
        }
    }

    /// Host form suitable for composing `host:port`.
    ///
    /// IPv6 literals are wrapped in brackets so the port separator stays
    /// unambiguous.
    pub fn host(&self) -> String {
        match self {
            Self::V4(ip) => ip.to_string(),
            Self::V6(ip) => format!("[{}]", ip),
        }
    }
}

impl fmt::Display for AddressLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(ip) => write!(f, "{}", ip),
            Self::V6(ip) => write!(f, "{}", ip),
        }
    }
}

impl FromStr for AddressLiteral {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<AddressLiteral> for String {
    fn from(address: AddressLiteral) -> Self {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let addr = AddressLiteral::parse("192.168.1.10").unwrap();
        assert_eq!(addr, AddressLiteral::V4(Ipv4Addr::new(192, 168, 1, 10)));
    }

    #[test]
    fn test_parse_ipv6_falls_back() {
        let addr = AddressLiteral::parse("2001:db8::1").unwrap();
        assert!(matches!(addr, AddressLiteral::V6(_)));
        assert_eq!(addr.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_parse_rejects_hostnames_and_garbage() {
        assert!(matches!(
            AddressLiteral::parse("not_an_ip"),
            Err(ConfigError::InvalidAddress(_))
        ));
        assert!(AddressLiteral::parse("mc.example.com").is_err());
        assert!(AddressLiteral::parse("256.1.1.1").is_err());
        assert!(AddressLiteral::parse("").is_err());
        assert!(AddressLiteral::parse("[::1]").is_err());
    }

    #[test]
    fn test_parse_v6_only() {
        assert!(AddressLiteral::parse_v6("::1").is_ok());
        assert!(AddressLiteral::parse_v6("127.0.0.1").is_err());
    }

    #[test]
    fn test_host_brackets_ipv6_only() {
        assert_eq!(AddressLiteral::parse("::1").unwrap().host(), "[::1]");
        assert_eq!(AddressLiteral::parse("10.0.0.2").unwrap().host(), "10.0.0.2");
    }

    #[test]
    fn test_display_is_canonical() {
        let addr = AddressLiteral::parse("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
        assert_eq!(addr.to_string(), "2001:db8::1");
    }

    #[test]
    fn test_unspecified_and_loopback() {
        let any4 = AddressLiteral::parse("0.0.0.0").unwrap();
        let any6 = AddressLiteral::parse("::").unwrap();
        assert!(any4.is_unspecified());
        assert!(any6.is_unspecified());
        assert_eq!(any4.loopback().to_string(), "127.0.0.1");
        assert_eq!(any6.loopback().to_string(), "::1");
        assert!(!AddressLiteral::parse("127.0.0.1").unwrap().is_unspecified());
    }
}
