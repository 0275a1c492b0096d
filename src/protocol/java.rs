//! Java Edition status handshake (Server List Ping).
//!
//! Packets are VarInt length-prefixed. The client sends a handshake with
//! next-state `1` followed by an empty status request, and the server answers
//! with a single packet carrying a JSON status document.

use super::{strip_formatting, unbracket, with_attempts, Protocol, ServerStatus, StatusProtocol};
use crate::error::{StatusError, StatusResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Protocol version sent in the handshake. Servers answer status requests
/// for any version.
pub const PROTOCOL_VERSION: i32 = 47;

/// Largest status frame accepted.
const MAX_FRAME_LEN: usize = 2 * 1024 * 1024;

/// Handshake and status request share packet id 0.
const PACKET_ID: i32 = 0x00;

/// Next-state value selecting the status flow.
const NEXT_STATE_STATUS: i32 = 1;

/// Java Edition status client.
#[derive(Debug, Clone)]
pub struct JavaClient {
    attempts: u32,
}

impl Default for JavaClient {
    fn default() -> Self {
        Self {
            attempts: super::DEFAULT_ATTEMPTS,
        }
    }
}

impl JavaClient {
    /// Create a client with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of handshake attempts.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    async fn status_once(&self, host: &str, port: u16) -> StatusResult<ServerStatus> {
        let start = Instant::now();
        let mut stream = TcpStream::connect(format!("{}:{}", host, port))
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::ConnectionRefused => StatusError::ConnectionRefused,
                _ => StatusError::Io(e),
            })?;

        let mut request = frame(&handshake(PROTOCOL_VERSION, unbracket(host), port));
        request.extend(frame(&status_request()));
        stream.write_all(&request).await?;

        let json = read_status_response(&mut stream).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        parse_status(&json, latency_ms)
    }
}

#[async_trait]
impl StatusProtocol for JavaClient {
    fn protocol(&self) -> Protocol {
        Protocol::Java
    }

    async fn attempt(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> StatusResult<ServerStatus> {
        with_attempts(self.attempts, timeout, || self.status_once(host, port)).await
    }
}

/// Append a VarInt (LEB128 over the two's-complement bits).
pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

/// Read a VarInt of at most five bytes.
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> StatusResult<i32> {
    let mut result = 0u32;
    for i in 0..5 {
        let byte = reader.read_u8().await?;
        result |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(StatusError::MalformedResponse("VarInt longer than 5 bytes".into()))
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

/// Prefix a packet body with its VarInt length.
fn frame(packet: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packet.len() + 5);
    write_varint(&mut out, packet.len() as i32);
    out.extend_from_slice(packet);
    out
}

fn handshake(protocol_version: i32, host: &str, port: u16) -> Vec<u8> {
    let mut packet = Vec::with_capacity(host.len() + 16);
    write_varint(&mut packet, PACKET_ID);
    write_varint(&mut packet, protocol_version);
    write_string(&mut packet, host);
    packet.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut packet, NEXT_STATE_STATUS);
    packet
}

fn status_request() -> Vec<u8> {
    let mut packet = Vec::with_capacity(1);
    write_varint(&mut packet, PACKET_ID);
    packet
}

/// Read one status response frame and return its JSON payload.
async fn read_status_response<R: AsyncRead + Unpin>(reader: &mut R) -> StatusResult<String> {
    let frame_len = read_length(reader).await?;
    if frame_len == 0 {
        return Err(StatusError::MalformedResponse("empty frame".into()));
    }

    let mut body = vec![0u8; frame_len];
    reader.read_exact(&mut body).await?;
    let mut body = body.as_slice();

    let packet_id = read_varint(&mut body).await?;
    if packet_id != PACKET_ID {
        return Err(StatusError::MalformedResponse(format!(
            "unexpected packet id {:#04x}",
            packet_id
        )));
    }

    let json_len = read_length(&mut body).await?;
    if json_len > body.len() {
        return Err(StatusError::MalformedResponse("truncated status".into()));
    }

    String::from_utf8(body[..json_len].to_vec())
        .map_err(|_| StatusError::MalformedResponse("status is not UTF-8".into()))
}

async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> StatusResult<usize> {
    let len = read_varint(reader).await?;
    usize::try_from(len)
        .ok()
        .filter(|&len| len <= MAX_FRAME_LEN)
        .ok_or_else(|| StatusError::MalformedResponse(format!("bad length {}", len)))
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    version: Option<VersionPayload>,
    players: Option<PlayersPayload>,
    description: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VersionPayload {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayersPayload {
    online: Option<u32>,
    max: Option<u32>,
}

fn parse_status(json: &str, latency_ms: u64) -> StatusResult<ServerStatus> {
    let payload: StatusPayload = serde_json::from_str(json)
        .map_err(|e| StatusError::MalformedResponse(format!("invalid status JSON: {}", e)))?;

    let mut status = ServerStatus::new(Protocol::Java, latency_ms);
    status.version = payload.version.and_then(|v| v.name);
    status.motd = payload
        .description
        .as_ref()
        .map(chat_text)
        .map(|text| strip_formatting(&text));
    if let Some(players) = payload.players {
        status.players_online = players.online;
        status.players_max = players.max;
    }

    Ok(status)
}

/// Flatten a chat component (string, object with `text`/`extra`, or array).
fn chat_text(component: &serde_json::Value) -> String {
    use serde_json::Value;

    match component {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts.iter().map(chat_text).collect(),
        Value::Object(map) => {
            let mut text = map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(Value::Array(extra)) = map.get("extra") {
                text.extend(extra.iter().map(chat_text));
            }
            text
        }
        _ => String::new(),
    }
}
