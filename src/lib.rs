//! # mcbeacon - A Healthcheck for Minecraft Servers
//!
//! mcbeacon finds a server's bind address in its own configuration file and
//! checks that the server answers a status request, over the Java Edition
//! Server List Ping, the Bedrock Edition RakNet ping, or both at once.
//!
//! ## Features
//!
//! - **Config Detection**: `server.properties`, proxy `config.yml` listeners
//!   and `velocity.toml` bind addresses
//! - **Concurrent Probing**: Java and Bedrock handshakes race; the first
//!   answer wins
//! - **Container Friendly**: exit codes for orchestrators, options from the
//!   environment
//! - **Multiple Output Formats**: Plain text and JSON
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use mcbeacon::config::{ConfigDocument, ConfigParser};
//! use mcbeacon::probe::{ProtocolSelection, ServerProbe, DEFAULT_TIMEOUT};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let document = ConfigDocument::load(Path::new("/srv/minecraft/server.properties")).unwrap();
//!     let binding = ConfigParser::new().parse(&document).unwrap();
//!
//!     let probe = ServerProbe::new(DEFAULT_TIMEOUT);
//!     let up = probe.probe(&binding, ProtocolSelection::Both).await;
//!
//!     println!("{} is {}", binding, if up { "up" } else { "down" });
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Address and binding types
//! - [`config`] - Config file location and the grammar cascade
//! - [`protocol`] - Java and Bedrock status clients
//! - [`probe`] - Concurrent probe race
//! - [`error`] - Error types and exit codes
//! - [`output`] - Report formatting

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod probe;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigDocument, ConfigParser};
pub use error::{CliError, ConfigError, ProbeError, StatusError};
pub use probe::{ProtocolSelection, ServerProbe};
pub use protocol::{Protocol, ServerStatus, StatusProtocol};
pub use types::{AddressLiteral, ServerBinding};
