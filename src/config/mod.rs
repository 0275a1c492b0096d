//! Server configuration detection.
//!
//! A located document is offered to each known grammar in a fixed order.
//! A grammar that does not recognise the document yields
//! [`ParseOutcome::NoMatch`] and the next one is tried. A grammar that finds
//! its keys owns the document: a bad value under it is reported as-is and
//! no later grammar runs.

mod bind;
mod listeners;
mod locator;
mod properties;

pub use locator::{default_search_root, locate, ConfigDocument, CANDIDATES};
pub use properties::PropertiesError;

use crate::error::{ConfigError, ConfigResult};
use crate::types::ServerBinding;
use tracing::{debug, info};

/// Result of offering a document to one grammar.
#[derive(Debug)]
pub enum ParseOutcome {
    /// Not this grammar, or the expected keys are absent.
    NoMatch,
    /// This grammar's keys are present but a value is malformed.
    Invalid(ConfigError),
    /// A complete binding.
    Matched(ServerBinding),
}

/// A grammar: a name for logging and a pure extractor.
pub type Grammar = (&'static str, fn(&str) -> ParseOutcome);

/// Grammars in the order they are tried.
pub const GRAMMARS: [Grammar; 3] = [
    ("properties", properties::extract),
    ("yaml listeners", listeners::extract),
    ("toml bind", bind::extract),
];

/// Run the grammar cascade over `text`.
///
/// `name` identifies the document in the `UnsupportedFormat` error.
pub fn cascade(name: &str, text: &str, grammars: &[Grammar]) -> ConfigResult<ServerBinding> {
    for (grammar, extract) in grammars {
        match extract(text) {
            ParseOutcome::NoMatch => debug!("{}: no {} match", name, grammar),
            ParseOutcome::Invalid(e) => {
                debug!("{}: {} match with bad value: {}", name, grammar, e);
                return Err(e);
            }
            ParseOutcome::Matched(binding) => {
                info!("{}: {} binding {}", name, grammar, binding);
                return Ok(binding);
            }
        }
    }

    Err(ConfigError::UnsupportedFormat(name.to_string()))
}

/// Replace a wildcard bind address with loopback of the same family.
///
/// A server bound to `0.0.0.0` or `::` is reachable on loopback from the
/// same host or container, whereas the wildcard itself is not a dialable
/// destination.
pub fn normalize_any_address(binding: ServerBinding) -> ServerBinding {
    if binding.address.is_unspecified() {
        ServerBinding::new(binding.address.loopback(), binding.port)
    } else {
        binding
    }
}

/// Turns configuration documents into server bindings.
#[derive(Debug, Clone, Copy)]
pub struct ConfigParser {
    rewrite_any_address: bool,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self {
            rewrite_any_address: true,
        }
    }
}

impl ConfigParser {
    /// Create a parser that rewrites wildcard addresses to loopback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the wildcard-to-loopback rewrite.
    pub fn with_any_address_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_any_address = enabled;
        self
    }

    /// Parse a document into a binding.
    pub fn parse(&self, document: &ConfigDocument) -> ConfigResult<ServerBinding> {
        let binding = cascade(document.name(), &document.text(), &GRAMMARS)?;

        if self.rewrite_any_address && binding.address.is_unspecified() {
            let normalized = normalize_any_address(binding);
            debug!("rewrote wildcard {} to {}", binding, normalized);
            return Ok(normalized);
        }

        Ok(binding)
    }
}
