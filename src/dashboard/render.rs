//! HTML fragments for the dashboard regions.
//!
//! Everything here is pure: a response body goes in, the markup that replaces
//! a region goes out. Text that came from a reporter is escaped before it is
//! interpolated.

use std::fmt::Write;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::model::{NetworkEvent, OrgStats, Timestamp};

/// Placeholder shown in the org-stats region when nothing was reported yet.
pub const NO_ORG_DATA: &str = r#"<div class="no-events">No data yet...</div>"#;

/// Placeholder shown in the events region when the list is empty.
pub const NO_EVENTS: &str =
    r#"<div class="no-events">No events yet. Waiting for ARP traffic...</div>"#;

/// Rendering of a timestamp that cannot be turned into a date.
pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Largest magnitude, in milliseconds from the epoch, accepted as a date.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

/// Format an event timestamp in the local timezone.
///
/// Unparseable or out-of-range input yields [`INVALID_DATE`].
#[must_use]
pub fn format_time(timestamp: &Timestamp) -> String {
    parse_timestamp(timestamp).map_or_else(
        || INVALID_DATE.to_string(),
        |instant| instant.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
    )
}

/// Interpret a reported timestamp as an instant.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339, RFC 2822,
/// a local date-time without offset, then a bare UTC date.
#[must_use]
pub fn parse_timestamp(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
    match timestamp {
        Timestamp::Millis(millis) => {
            if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
                return None;
            }
            #[allow(clippy::cast_possible_truncation)]
            DateTime::from_timestamp_millis(millis.trunc() as i64)
        }
        Timestamp::Text(text) => parse_date_text(text.trim()),
        Timestamp::Other(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// CSS-safe token for an organization name.
///
/// Lowercases and keeps only `[a-z0-9]`. Distinct names may collide.
#[must_use]
pub fn org_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Escape text for use inside element content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Markup for the `org-stats-container` region.
#[must_use]
pub fn render_org_stats(stats: &OrgStats) -> String {
    if stats.is_empty() {
        return NO_ORG_DATA.to_string();
    }

    let mut html = String::new();
    for (org, count) in stats.iter() {
        let _ = write!(
            html,
            r#"
<div class="org-stat-card org-{slug}">
    <div class="org-name">{name}</div>
    <div class="org-count">{count} reports</div>
</div>"#,
            slug = org_slug(org),
            name = escape_html(org),
        );
    }
    html
}

/// Markup for the `events-list` region, one block per event in the given order.
#[must_use]
pub fn render_events(events: &[NetworkEvent]) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }
    events.iter().map(render_event).collect()
}

fn render_event(event: &NetworkEvent) -> String {
    let class = event.event_type.css_class();
    let time = event
        .timestamp
        .as_ref()
        .map_or_else(|| INVALID_DATE.to_string(), format_time);

    let mut details = String::new();
    push_detail(&mut details, "IP", &event.ip_address);
    push_detail(&mut details, "MAC", &event.mac_address);
    if let Some(previous) = event.previous_mac() {
        push_detail(&mut details, "Previous MAC", previous);
    }
    push_detail(&mut details, "Node", &event.recorded_by);
    if let Some(hostname) = event.hostname() {
        push_detail(&mut details, "Hostname", hostname);
    }

    format!(
        r#"
<div class="event {class}">
    <div class="event-header">
        <span class="event-type {class}">{label}</span>
        <span class="event-time">{time}</span>
    </div>
    <div class="event-details">{details}
    </div>
    <div class="event-message">{message}</div>
</div>"#,
        label = escape_html(event.event_type.as_str()),
        message = escape_html(&event.message),
    )
}

fn push_detail(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        r#"
        <div class="event-detail">
            <strong>{label}:</strong> {value}
        </div>"#,
        value = escape_html(value),
    );
}
