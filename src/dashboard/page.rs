//! Host page that carries the dashboard regions.

use std::collections::HashMap;
use std::fmt::Write;

use super::document::{
    EVENTS_LIST, ORG_STATS_CONTAINER, STAT_MATCH, STAT_NEW, STAT_SPOOFING, STAT_TOTAL,
};

const STYLE: &str = r"
body { font-family: sans-serif; margin: 0; background: #10141a; color: #e6e6e6; }
header { padding: 16px 24px; background: #1b2230; }
main { padding: 24px; }
.stats { display: flex; gap: 16px; margin-bottom: 24px; }
.stat-card { flex: 1; background: #1b2230; border-radius: 8px; padding: 16px; }
.stat-value { font-size: 2em; font-weight: bold; }
.org-stats { display: flex; flex-wrap: wrap; gap: 12px; margin-bottom: 24px; }
.org-stat-card { background: #1b2230; border-radius: 8px; padding: 12px 16px; }
.event { background: #1b2230; border-left: 4px solid #5c6370; margin-bottom: 12px; padding: 12px; }
.event.spoofing { border-color: #e06c75; }
.event.new { border-color: #61afef; }
.event.match { border-color: #98c379; }
.event-header { display: flex; justify-content: space-between; }
.event-type { text-transform: uppercase; font-weight: bold; }
.event-details { display: flex; flex-wrap: wrap; gap: 16px; margin: 8px 0; }
.no-events { color: #8a8f98; font-style: italic; }
";

const STAT_CARDS: [(&str, &str); 4] = [
    (STAT_TOTAL, "Total Events"),
    (STAT_SPOOFING, "Spoofing Attacks"),
    (STAT_NEW, "New Devices"),
    (STAT_MATCH, "Valid Matches"),
];

/// Full HTML document with each region filled from `regions`.
///
/// Regions absent from the map render empty. With `refresh_secs`, the page
/// asks the browser to reload itself on that period.
#[must_use]
pub fn render_page<S: std::hash::BuildHasher>(
    regions: &HashMap<String, String, S>,
    refresh_secs: Option<u64>,
) -> String {
    let region = |id: &str| regions.get(id).map_or("", String::as_str);

    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    if let Some(secs) = refresh_secs {
        let _ = writeln!(html, "<meta http-equiv=\"refresh\" content=\"{secs}\">");
    }
    let _ = writeln!(
        html,
        "<title>ARP Spoofing Detection Dashboard</title>\n<style>{STYLE}</style>\n</head>"
    );
    html.push_str("<body>\n<header><h1>ARP Spoofing Detection Dashboard</h1></header>\n<main>\n");

    html.push_str("<section class=\"stats\">\n");
    for (id, label) in STAT_CARDS {
        let _ = writeln!(
            html,
            "<div class=\"stat-card\"><div class=\"stat-label\">{label}</div>\
             <div class=\"stat-value\" id=\"{id}\">{}</div></div>",
            region(id)
        );
    }
    html.push_str("</section>\n");

    let _ = writeln!(
        html,
        "<h2>Reports by Organization</h2>\n<section class=\"org-stats\" id=\"{ORG_STATS_CONTAINER}\">{}</section>",
        region(ORG_STATS_CONTAINER)
    );
    let _ = writeln!(
        html,
        "<h2>Recent Events</h2>\n<section class=\"events\" id=\"{EVENTS_LIST}\">{}</section>",
        region(EVENTS_LIST)
    );

    html.push_str("</main>\n</body>\n</html>\n");
    html
}
