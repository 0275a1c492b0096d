//! Output formatting module.
//!
//! Provides plain text and JSON reports of a healthcheck run, plus styled
//! status messages.

use crate::cli::OutputFormat;
use crate::protocol::ServerStatus;
use crate::types::{AddressLiteral, ServerBinding};
use console::style;
use serde::Serialize;
use std::io::{self, Write};

/// Result of one healthcheck.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub address: AddressLiteral,
    pub port: u16,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServerStatus>,
}

impl HealthReport {
    /// Build a report from a probe outcome.
    pub fn new(binding: &ServerBinding, status: Option<ServerStatus>) -> Self {
        Self {
            address: binding.address,
            port: binding.port,
            reachable: status.is_some(),
            status,
        }
    }
}

/// Print a report in the requested format.
pub fn print_report(report: &HealthReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)
}

/// Write a report in the requested format.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &HealthReport,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)
        }
    }
}

fn write_plain<W: Write>(out: &mut W, report: &HealthReport) -> io::Result<()> {
    let target = ServerBinding::new(report.address, report.port);

    let Some(status) = &report.status else {
        return writeln!(
            out,
            "{} {} did not respond",
            style("✗").red().bold(),
            style(target).bold()
        );
    };

    let mut details = vec![format!("{} ms", status.latency_ms)];
    if let Some(version) = &status.version {
        details.push(version.clone());
    }
    match (status.players_online, status.players_max) {
        (Some(online), Some(max)) => details.push(format!("{}/{} players", online, max)),
        (Some(online), None) => details.push(format!("{} players", online)),
        _ => {}
    }

    writeln!(
        out,
        "{} {} is up over {} ({})",
        style("✓").green().bold(),
        style(target).bold(),
        style(status.protocol).cyan(),
        details.join(", ")
    )
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Protocol;

    fn render(report: &HealthReport, format: OutputFormat) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        write_report(&mut buf, report, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_up() {
        let binding = ServerBinding::parse("127.0.0.1:25565").unwrap();
        let mut status = ServerStatus::new(Protocol::Java, 4);
        status.version = Some("1.21".into());
        status.players_online = Some(1);
        status.players_max = Some(20);

        let text = render(&HealthReport::new(&binding, Some(status)), OutputFormat::Plain);
        assert_eq!(
            text,
            "✓ 127.0.0.1:25565 is up over Java (4 ms, 1.21, 1/20 players)\n"
        );
    }

    #[test]
    fn test_plain_down_brackets_ipv6() {
        let binding = ServerBinding::parse("[::1]:19132").unwrap();
        let text = render(&HealthReport::new(&binding, None), OutputFormat::Plain);
        assert_eq!(text, "✗ [::1]:19132 did not respond\n");
    }

    #[test]
    fn test_json_report() {
        let binding = ServerBinding::parse("10.0.0.1:19132").unwrap();
        let status = ServerStatus::new(Protocol::Bedrock, 9);
        let text = render(&HealthReport::new(&binding, Some(status)), OutputFormat::Json);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["address"], "10.0.0.1");
        assert_eq!(value["port"], 19132);
        assert_eq!(value["reachable"], true);
        assert_eq!(value["status"]["protocol"], "bedrock");
        assert!(value["status"].get("motd").is_none());
    }

    #[test]
    fn test_json_report_unreachable_omits_status() {
        let binding = ServerBinding::parse("10.0.0.1:25565").unwrap();
        let text = render(&HealthReport::new(&binding, None), OutputFormat::Json);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["reachable"], false);
        assert!(value.get("status").is_none());
    }
}
