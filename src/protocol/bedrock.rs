//! Bedrock Edition status handshake.
//!
//! Sends a RakNet Unconnected Ping and waits for the matching Unconnected
//! Pong. The pong carries a `;`-separated advertisement:
//!
//! ```text
//! MCPE;motd;protocol;version;online;max;server-id;sub-motd;gamemode;...
//! ```
//!
//! UDP gives no delivery guarantee, so the whole exchange is retried.

use super::{strip_formatting, with_attempts, Protocol, ServerStatus, StatusProtocol};
use crate::error::{StatusError, StatusResult};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::net::{lookup_host, UdpSocket};

/// RakNet offline message marker.
pub const OFFLINE_MAGIC: [u8; 16] = [
    0x00, 0xff, 0xff, 0x00, 0xfe, 0xfe, 0xfe, 0xfe, 0xfd, 0xfd, 0xfd, 0xfd, 0x12, 0x34, 0x56, 0x78,
];

/// Unconnected Ping packet id.
pub const UNCONNECTED_PING: u8 = 0x01;
/// Unconnected Pong packet id.
pub const UNCONNECTED_PONG: u8 = 0x1c;

/// id + time + server GUID + magic + string length.
const PONG_HEADER_LEN: usize = 1 + 8 + 8 + 16 + 2;

/// Bedrock Edition status client.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client_guid: i64,
    attempts: u32,
}

impl Default for BedrockClient {
    fn default() -> Self {
        Self {
            client_guid: rand::random(),
            attempts: super::DEFAULT_ATTEMPTS,
        }
    }
}

impl BedrockClient {
    /// Create a client with a random GUID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of ping attempts.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    async fn resolve(host: &str, port: u16) -> StatusResult<SocketAddr> {
        let target = format!("{}:{}", host, port);
        let addr = lookup_host(&target).await?.next();
        addr.ok_or(StatusError::Unresolvable(target))
    }

    async fn status_once(&self, addr: SocketAddr) -> StatusResult<ServerStatus> {
        let local: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(addr).await?;

        let start = Instant::now();
        let timestamp = unix_millis();
        socket.send(&unconnected_ping(timestamp, self.client_guid)).await?;

        let mut buf = [0u8; 2048];
        loop {
            let n = socket.recv(&mut buf).await?;
            match parse_pong(&buf[..n]) {
                Ok((echoed, advertisement)) if echoed == timestamp => {
                    let latency_ms = start.elapsed().as_millis() as u64;
                    return Ok(parse_advertisement(&advertisement, latency_ms));
                }
                // Stale pong for another ping.
                Ok(_) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl StatusProtocol for BedrockClient {
    fn protocol(&self) -> Protocol {
        Protocol::Bedrock
    }

    async fn attempt(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> StatusResult<ServerStatus> {
        let addr = Self::resolve(host, port).await?;
        with_attempts(self.attempts, timeout, || self.status_once(addr)).await
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Build an Unconnected Ping.
pub fn unconnected_ping(timestamp: i64, client_guid: i64) -> Vec<u8> {
    let mut packet = Vec::with_capacity(33);
    packet.push(UNCONNECTED_PING);
    packet.extend_from_slice(&timestamp.to_be_bytes());
    packet.extend_from_slice(&OFFLINE_MAGIC);
    packet.extend_from_slice(&client_guid.to_be_bytes());
    packet
}

/// Decode an Unconnected Pong into the echoed timestamp and advertisement.
pub fn parse_pong(packet: &[u8]) -> StatusResult<(i64, String)> {
    if packet.len() < PONG_HEADER_LEN {
        return Err(StatusError::MalformedResponse(format!(
            "pong too short ({} bytes)",
            packet.len()
        )));
    }
    if packet[0] != UNCONNECTED_PONG {
        return Err(StatusError::MalformedResponse(format!(
            "unexpected packet id {:#04x}",
            packet[0]
        )));
    }

    let mut time = [0u8; 8];
    time.copy_from_slice(&packet[1..9]);
    if packet[17..33] != OFFLINE_MAGIC {
        return Err(StatusError::MalformedResponse("missing offline magic".into()));
    }

    let len = u16::from_be_bytes([packet[33], packet[34]]) as usize;
    let body = packet
        .get(PONG_HEADER_LEN..PONG_HEADER_LEN + len)
        .ok_or_else(|| StatusError::MalformedResponse("truncated advertisement".into()))?;

    Ok((
        i64::from_be_bytes(time),
        String::from_utf8_lossy(body).into_owned(),
    ))
}

/// Pull version, motd and player counts out of the advertisement.
fn parse_advertisement(advertisement: &str, latency_ms: u64) -> ServerStatus {
    let fields: Vec<&str> = advertisement.split(';').collect();
    let field = |i: usize| fields.get(i).copied().filter(|f| !f.is_empty());

    let mut status = ServerStatus::new(Protocol::Bedrock, latency_ms);
    status.motd = field(1).map(strip_formatting);
    status.version = field(3).map(str::to_string);
    status.players_online = field(4).and_then(|f| f.parse().ok());
    status.players_max = field(5).and_then(|f| f.parse().ok());
    status
}
