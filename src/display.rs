//! Colored console output for the collector and dashboard commands.

use std::io::{self, Write};

use chrono::Local;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Placeholder for a field the reporter left out.
const MISSING: &str = "N/A";

/// Local wall-clock format shared by console lines and stored `received_at` values.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current local time in [`LOCAL_TIME_FORMAT`].
#[must_use]
pub fn local_timestamp() -> String {
    Local::now().format(LOCAL_TIME_FORMAT).to_string()
}

fn field<'a>(event: &'a Value, key: &str) -> &'a str {
    event.get(key).and_then(Value::as_str).unwrap_or(MISSING)
}

/// One-line summary of a received event, without colors.
#[must_use]
pub fn describe_event(event: &Value) -> String {
    let ip = field(event, "ipAddress");
    let mac = field(event, "macAddress");
    match event.get("eventType").and_then(Value::as_str) {
        Some("spoofing") => format!(
            "SPOOFING DETECTED! IP: {ip}, Old: {}, New: {mac}",
            field(event, "previousMAC")
        ),
        Some("new") => format!("New device: IP: {ip}, MAC: {mac}"),
        _ => format!("Valid: IP: {ip}, MAC: {mac}"),
    }
}

/// Print a received event, colored by type.
pub fn print_event_received(event: &Value) {
    let summary = describe_event(event);
    let ts = local_timestamp();
    match event.get("eventType").and_then(Value::as_str) {
        Some("spoofing") => println!(
            "{} {} {}",
            ts.dimmed(),
            "[SPOOFING]".red().bold(),
            summary.red()
        ),
        Some("new") => println!("{} {} {}", ts.dimmed(), "[NEW]".blue().bold(), summary),
        _ => println!("{} {} {}", ts.dimmed(), "[VALID]".green().bold(), summary),
    }
    let _ = io::stdout().flush();
}

/// Print collector startup information.
pub fn print_collector_banner(address: &str) {
    println!("{}", "ARP Detection Collector starting...".bold());
    println!("  {} http://{address}", "Dashboard:".cyan());
    println!("  {} http://{address}/api/event", "Event endpoint:".cyan());
    let _ = io::stdout().flush();
}

/// Print dashboard poller startup information.
pub fn print_watch_banner(backend: &str, interval_ms: u64, output: Option<&str>) {
    println!(
        "{} {} polling {} every {interval_ms}ms",
        local_timestamp().dimmed(),
        "[WATCH]".magenta().bold(),
        backend.cyan()
    );
    if let Some(path) = output {
        println!("  {} {path}", "Page:".cyan());
    }
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
