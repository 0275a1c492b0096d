//! `server.properties` style documents.
//!
//! Implements the Java properties line format: `#`/`!` comments, line
//! continuation with a trailing backslash, `=`, `:` or whitespace key
//! separators, and backslash escapes including `\uXXXX`.

use super::ParseOutcome;
use crate::types::{parse_port, AddressLiteral, ServerBinding};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Key holding the bind address.
pub const ADDRESS_KEY: &str = "server-address";
/// Key holding the bind port.
pub const PORT_KEY: &str = "server-port";

/// Error type for the properties reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertiesError {
    #[error("malformed \\uXXXX escape on line {0}")]
    MalformedUnicodeEscape(usize),
}

/// Extract a binding from a properties document.
pub fn extract(text: &str) -> ParseOutcome {
    let properties = match read(text) {
        Ok(properties) => properties,
        Err(e) => {
            debug!("not a properties document: {}", e);
            return ParseOutcome::NoMatch;
        }
    };

    let (Some(address), Some(port)) = (properties.get(ADDRESS_KEY), properties.get(PORT_KEY))
    else {
        return ParseOutcome::NoMatch;
    };

    let address = match AddressLiteral::parse(address.trim()) {
        Ok(address) => address,
        Err(e) => return ParseOutcome::Invalid(e),
    };
    match parse_port(port.trim()) {
        Ok(port) => ParseOutcome::Matched(ServerBinding::new(address, port)),
        Err(e) => ParseOutcome::Invalid(e),
    }
}

/// Read every key/value pair. Later keys override earlier ones.
pub fn read(text: &str) -> Result<HashMap<String, String>, PropertiesError> {
    let mut properties = HashMap::new();

    for (line_no, line) in logical_lines(text) {
        let (key, value) = split_entry(&line);
        let key = unescape(key, line_no)?;
        let value = unescape(value, line_no)?;
        properties.insert(key, value);
    }

    Ok(properties)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Join continued lines and drop comments and blank lines.
///
/// Yields the 1-based number of the line each entry starts on.
fn logical_lines(text: &str) -> Vec<(usize, Vec<char>)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut current: Option<(usize, Vec<char>)> = None;

    for (idx, raw) in normalized.split('\n').enumerate() {
        let stripped = raw.trim_start_matches(is_blank);

        let (start, mut buf) = match current.take() {
            Some(pending) => pending,
            None => {
                if stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with('!') {
                    continue;
                }
                (idx + 1, Vec::new())
            }
        };

        buf.extend(stripped.chars());

        let trailing = buf.iter().rev().take_while(|&&c| c == '\\').count();
        if trailing % 2 == 1 {
            buf.pop();
            current = Some((start, buf));
        } else {
            lines.push((start, buf));
        }
    }

    if let Some(pending) = current {
        lines.push(pending);
    }

    lines
}

/// Split a logical line into raw key and value slices.
fn split_entry(line: &[char]) -> (&[char], &[char]) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (i, &c) in line.iter().enumerate() {
        if !escaped && (c == '=' || c == ':') {
            key_end = i;
            value_start = i + 1;
            has_separator = true;
            break;
        }
        if !escaped && is_blank(c) {
            key_end = i;
            value_start = i + 1;
            break;
        }
        escaped = c == '\\' && !escaped;
    }

    while value_start < line.len() {
        let c = line[value_start];
        if !is_blank(c) {
            if !has_separator && (c == '=' || c == ':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    (&line[..key_end], &line[value_start..])
}

fn unescape(raw: &[char], line_no: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.iter().copied().peekable();
    let mut high_surrogate: Option<u32> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut high_surrogate);
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            break;
        };

        if escape != 'u' {
            flush_surrogate(&mut out, &mut high_surrogate);
            out.push(match escape {
                't' => '\t',
                'n' => '\n',
                'r' => '\r',
                'f' => '\x0c',
                other => other,
            });
            continue;
        }

        let mut code = 0u32;
        for _ in 0..4 {
            let digit = chars
                .next()
                .and_then(|d| d.to_digit(16))
                .ok_or(PropertiesError::MalformedUnicodeEscape(line_no))?;
            code = (code << 4) | digit;
        }

        match code {
            0xD800..=0xDBFF => {
                flush_surrogate(&mut out, &mut high_surrogate);
                high_surrogate = Some(code);
            }
            0xDC00..=0xDFFF => match high_surrogate.take() {
                Some(high) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                None => out.push(char::REPLACEMENT_CHARACTER),
            },
            _ => {
                flush_surrogate(&mut out, &mut high_surrogate);
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    flush_surrogate(&mut out, &mut high_surrogate);
    Ok(out)
}

/// An unpaired high surrogate becomes U+FFFD.
fn flush_surrogate(out: &mut String, high: &mut Option<u32>) {
    if high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}
