//! End-to-end checks: locate a config file, parse its binding and probe a
//! fake server listening on loopback.

use mcbeacon::config::{locate, ConfigDocument, ConfigParser};
use mcbeacon::error::ConfigError;
use mcbeacon::probe::{ProtocolSelection, ServerProbe};
use mcbeacon::protocol::bedrock::{OFFLINE_MAGIC, UNCONNECTED_PONG};
use mcbeacon::protocol::java::{read_varint, write_varint};
use mcbeacon::protocol::Protocol;
use mcbeacon::types::ServerBinding;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

const STATUS_JSON: &str =
    r#"{"version":{"name":"1.21.1"},"players":{"online":3,"max":20},"description":"A Minecraft Server"}"#;

/// Answer one Server List Ping on `listener`.
async fn fake_java_server(listener: TcpListener) {
    let (mut socket, _) = listener.accept().await.unwrap();

    for _ in 0..2 {
        let len = read_varint(&mut socket).await.unwrap() as usize;
        let mut packet = vec![0u8; len];
        socket.read_exact(&mut packet).await.unwrap();
    }

    let mut body = Vec::new();
    write_varint(&mut body, 0x00);
    write_varint(&mut body, STATUS_JSON.len() as i32);
    body.extend_from_slice(STATUS_JSON.as_bytes());

    let mut framed = Vec::new();
    write_varint(&mut framed, body.len() as i32);
    framed.extend_from_slice(&body);
    socket.write_all(&framed).await.unwrap();
}

/// Answer one Unconnected Ping on `socket`.
async fn fake_bedrock_server(socket: UdpSocket) {
    let mut buf = [0u8; 64];
    let (_, peer) = socket.recv_from(&mut buf).await.unwrap();

    let advertisement = "MCPE;Bedrock level;649;1.20.60;1;8;42;world;Survival";
    let mut pong = vec![UNCONNECTED_PONG];
    pong.extend_from_slice(&buf[1..9]);
    pong.extend_from_slice(&7i64.to_be_bytes());
    pong.extend_from_slice(&OFFLINE_MAGIC);
    pong.extend_from_slice(&(advertisement.len() as u16).to_be_bytes());
    pong.extend_from_slice(advertisement.as_bytes());
    socket.send_to(&pong, peer).await.unwrap();
}

fn load_binding(dir: &TempDir) -> ServerBinding {
    let path = locate(dir.path()).unwrap();
    let document = ConfigDocument::load(&path).unwrap();
    ConfigParser::new().parse(&document).unwrap()
}

#[tokio::test]
async fn test_java_server_from_properties() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(fake_java_server(listener));

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("server.properties"),
        format!("#Minecraft server properties\nserver-address=0.0.0.0\nserver-port={}\nmotd=hello\n", port),
    )
    .unwrap();

    let binding = load_binding(&dir);
    assert_eq!(binding.to_string(), format!("127.0.0.1:{}", port));

    let probe = ServerProbe::new(Duration::from_secs(2));
    let status = probe.race(&binding, ProtocolSelection::Both).await.unwrap();
    assert_eq!(status.protocol, Protocol::Java);
    assert_eq!(status.version.as_deref(), Some("1.21.1"));
    assert_eq!(status.players_online, Some(3));

    server.await.unwrap();
}

#[tokio::test]
async fn test_bedrock_server_from_proxy_listeners() {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();
    tokio::spawn(fake_bedrock_server(socket));

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yml"),
        format!("listeners:\n  - host: 127.0.0.1:{}\n    motd: proxy\n", port),
    )
    .unwrap();

    let binding = load_binding(&dir);
    let probe = ServerProbe::new(Duration::from_secs(2));
    let status = probe
        .race(&binding, ProtocolSelection::Bedrock)
        .await
        .unwrap();
    assert_eq!(status.protocol, Protocol::Bedrock);
    assert_eq!(status.players_max, Some(8));
}

#[tokio::test]
async fn test_closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("velocity.toml"),
        format!("config-version = \"2.7\"\nbind = \"127.0.0.1:{}\"\n", port),
    )
    .unwrap();

    let binding = load_binding(&dir);
    let probe = ServerProbe::new(Duration::from_millis(100));
    assert!(!probe.probe(&binding, ProtocolSelection::Java).await);
}

#[tokio::test]
async fn test_invalid_selection_is_an_error() {
    let binding = ServerBinding::parse("127.0.0.1:25565").unwrap();
    let probe = ServerProbe::new(Duration::from_millis(100));
    assert!(probe.probe_named(&binding, "pocket").await.is_err());
}

#[test]
fn test_unrecognised_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("server.properties"), "difficulty=easy\n").unwrap();

    let path = locate(dir.path()).unwrap();
    let document = ConfigDocument::load(&path).unwrap();
    let err = ConfigParser::new().parse(&document).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn test_bad_port_is_not_unsupported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("server.properties"),
        "server-address=127.0.0.1\nserver-port=99999\n",
    )
    .unwrap();

    let path = locate(dir.path()).unwrap();
    let document = ConfigDocument::load(&path).unwrap();
    let err = ConfigParser::new().parse(&document).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPort(_)));
}
