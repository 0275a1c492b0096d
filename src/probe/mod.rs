//! Probe module - races status handshakes against a server binding.
//!
//! Each requested protocol runs in its own detached tokio task. The caller
//! resolves on the first successful handshake, or once every worker has
//! reported failure. Losing workers are never joined; they finish on their
//! own timeout or are dropped when the runtime shuts down.

use crate::error::{ProbeError, ProbeResult};
use crate::protocol::{BedrockClient, JavaClient, Protocol, ServerStatus, StatusProtocol};
use crate::types::ServerBinding;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default per-protocol handshake timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

/// Which protocols to probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ProtocolSelection {
    /// Java Edition only.
    Java,
    /// Bedrock Edition only.
    Bedrock,
    /// Both editions, raced.
    #[default]
    Both,
}

impl ProtocolSelection {
    /// Protocols this selection spawns a worker for.
    pub fn protocols(self) -> &'static [Protocol] {
        match self {
            Self::Java => &[Protocol::Java],
            Self::Bedrock => &[Protocol::Bedrock],
            Self::Both => &[Protocol::Java, Protocol::Bedrock],
        }
    }
}

impl fmt::Display for ProtocolSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Java => write!(f, "java"),
            Self::Bedrock => write!(f, "bedrock"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for ProtocolSelection {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "java" => Ok(Self::Java),
            "bedrock" => Ok(Self::Bedrock),
            "both" => Ok(Self::Both),
            _ => Err(ProbeError::InvalidProtocolSelection(s.to_string())),
        }
    }
}

/// Races protocol handshakes against a server.
#[derive(Clone)]
pub struct ServerProbe {
    clients: Vec<Arc<dyn StatusProtocol>>,
    timeout: Duration,
}

impl fmt::Debug for ServerProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocols: Vec<Protocol> = self.clients.iter().map(|c| c.protocol()).collect();
        f.debug_struct("ServerProbe")
            .field("protocols", &protocols)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServerProbe {
    /// Create a probe using the built-in Java and Bedrock clients.
    pub fn new(timeout: Duration) -> Self {
        let clients: Vec<Arc<dyn StatusProtocol>> =
            vec![Arc::new(JavaClient::new()), Arc::new(BedrockClient::new())];
        Self::with_clients(clients, timeout)
    }

    /// Create a probe with custom protocol clients.
    ///
    /// Each client serves the protocol it reports; a selected protocol with
    /// no client is skipped.
    pub fn with_clients(clients: Vec<Arc<dyn StatusProtocol>>, timeout: Duration) -> Self {
        Self { clients, timeout }
    }

    fn client(&self, protocol: Protocol) -> Option<Arc<dyn StatusProtocol>> {
        self.clients
            .iter()
            .find(|client| client.protocol() == protocol)
            .cloned()
    }

    /// Check whether any selected protocol answers at `binding`.
    ///
    /// Network failures are never errors; they only make the result `false`.
    pub async fn probe(&self, binding: &ServerBinding, protocols: ProtocolSelection) -> bool {
        self.race(binding, protocols).await.is_some()
    }

    /// Like [`probe`](Self::probe), for a selection given by name.
    ///
    /// An unknown name fails before any worker is spawned.
    pub async fn probe_named(&self, binding: &ServerBinding, protocols: &str) -> ProbeResult<bool> {
        let selection: ProtocolSelection = protocols.parse()?;
        Ok(self.probe(binding, selection).await)
    }

    /// Race the selected handshakes and return the first status received.
    ///
    /// Returns `None` only after every worker has finished without success.
    pub async fn race(
        &self,
        binding: &ServerBinding,
        protocols: ProtocolSelection,
    ) -> Option<ServerStatus> {
        let host = binding.address.host();
        let port = binding.port;
        let workers = protocols.protocols();

        // Each worker owns a sender; the channel closes once all are done.
        let (tx, mut rx) = mpsc::unbounded_channel();

        for &protocol in workers {
            let Some(client) = self.client(protocol) else {
                warn!("no {} client configured", protocol);
                continue;
            };
            let tx = tx.clone();
            let host = host.clone();
            let timeout = self.timeout;

            debug!("starting {} probe of {}:{}", protocol, host, port);
            tokio::spawn(async move {
                let outcome = match client.attempt(&host, port, timeout).await {
                    Ok(status) => {
                        debug!("{} answered in {} ms", protocol, status.latency_ms);
                        Some(status)
                    }
                    Err(e) => {
                        debug!("{} did not respond: {}", protocol, e);
                        None
                    }
                };
                // The receiver is gone if another worker already won.
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut finished = 0;
        while let Some(outcome) = rx.recv().await {
            finished += 1;
            if let Some(status) = outcome {
                info!("{} is up ({})", binding, status.protocol);
                return Some(status);
            }
        }

        info!(
            "{} did not answer any of {} protocol(s)",
            binding, finished
        );
        None
    }
}
