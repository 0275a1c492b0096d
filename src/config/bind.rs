//! Proxy `velocity.toml` documents, which carry `bind = "address:port"`.

use super::ParseOutcome;
use crate::types::ServerBinding;
use tracing::debug;

/// Top-level key holding `address:port`.
pub const BIND_KEY: &str = "bind";

/// Extract a binding from a TOML proxy config.
pub fn extract(text: &str) -> ParseOutcome {
    let table: toml::Table = match toml::from_str(text) {
        Ok(table) => table,
        Err(e) => {
            debug!("not a TOML document: {}", e);
            return ParseOutcome::NoMatch;
        }
    };

    match table.get(BIND_KEY).and_then(toml::Value::as_str) {
        Some(bind) => match ServerBinding::parse(bind) {
            Ok(binding) => ParseOutcome::Matched(binding),
            Err(e) => ParseOutcome::Invalid(e),
        },
        None => ParseOutcome::NoMatch,
    }
}
