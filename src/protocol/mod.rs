//! Status handshake clients.
//!
//! Defines a common interface for the Java and Bedrock handshakes so the
//! probe can race them interchangeably and tests can substitute fakes.

pub mod bedrock;
pub mod java;

pub use bedrock::BedrockClient;
pub use java::JavaClient;

use crate::error::{StatusError, StatusResult};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;

/// Default number of handshake attempts per probe.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// A Minecraft server wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Java Edition Server List Ping over TCP.
    Java,
    /// Bedrock Edition RakNet unconnected ping over UDP.
    Bedrock,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Java => write!(f, "Java"),
            Self::Bedrock => write!(f, "Bedrock"),
        }
    }
}

/// What a server reported in its status reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    /// Protocol that answered.
    pub protocol: Protocol,
    /// Advertised version name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Message of the day, with formatting stripped where possible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    /// Players currently online.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players_online: Option<u32>,
    /// Player capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players_max: Option<u32>,
    /// Round-trip time of the successful attempt in milliseconds.
    pub latency_ms: u64,
}

impl ServerStatus {
    /// Create a status with no details.
    pub fn new(protocol: Protocol, latency_ms: u64) -> Self {
        Self {
            protocol,
            version: None,
            motd: None,
            players_online: None,
            players_max: None,
            latency_ms,
        }
    }
}

/// A protocol-specific status handshake.
///
/// Every failure (timeout, refusal, I/O fault, garbage reply) is a
/// [`StatusError`]; callers treat them all as "did not respond".
#[async_trait]
pub trait StatusProtocol: Send + Sync {
    /// The protocol this client speaks.
    fn protocol(&self) -> Protocol;

    /// Attempt a status handshake against `host:port`.
    ///
    /// `host` is an address literal, bracketed when IPv6. `timeout` bounds
    /// each individual attempt.
    async fn attempt(&self, host: &str, port: u16, timeout: Duration)
        -> StatusResult<ServerStatus>;
}

/// Run `op` up to `attempts` times, each bounded by `limit`.
///
/// Returns the first success or the last failure.
pub(crate) async fn with_attempts<F, Fut, T>(
    attempts: u32,
    limit: Duration,
    mut op: F,
) -> StatusResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StatusResult<T>>,
{
    let mut last_error = StatusError::Timeout;

    for attempt in 1..=attempts.max(1) {
        match timeout(limit, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => last_error = e,
            Err(_) => last_error = StatusError::Timeout,
        }
        trace!("attempt {} failed: {}", attempt, last_error);
    }

    Err(last_error)
}

/// Strip the brackets `AddressLiteral::host` puts around IPv6 literals.
pub(crate) fn unbracket(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

/// Remove `§x` formatting codes from a message.
pub(crate) fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}
