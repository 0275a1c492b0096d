//! Proxy `config.yml` documents.
//!
//! The binding comes from the first `listeners` entry with a `host` string:
//!
//! ```yaml
//! listeners:
//! - query_port: 25577
//!   host: 0.0.0.0:25577
//! ```

use super::ParseOutcome;
use crate::types::ServerBinding;
use serde_yaml::Value;
use tracing::debug;

/// Top-level key holding the listener list.
pub const LISTENERS_KEY: &str = "listeners";
/// Per-listener key holding `address:port`.
pub const HOST_KEY: &str = "host";

/// Extract a binding from a YAML proxy config.
pub fn extract(text: &str) -> ParseOutcome {
    let document: Value = match serde_yaml::from_str(text) {
        Ok(document) => document,
        Err(e) => {
            debug!("not a YAML document: {}", e);
            return ParseOutcome::NoMatch;
        }
    };

    let Some(listeners) = document.get(LISTENERS_KEY).and_then(Value::as_sequence) else {
        return ParseOutcome::NoMatch;
    };

    let host = listeners
        .iter()
        .filter(|listener| listener.is_mapping())
        .find_map(|listener| listener.get(HOST_KEY).and_then(Value::as_str));

    match host {
        Some(host) => match ServerBinding::parse(host) {
            Ok(binding) => ParseOutcome::Matched(binding),
            Err(e) => ParseOutcome::Invalid(e),
        },
        None => ParseOutcome::NoMatch,
    }
}
