//! Wire types returned by the collector's read endpoints.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Label given to an event reported without a usable `eventType`.
pub const UNKNOWN_EVENT_TYPE: &str = "unknown";

/// Aggregate counters served by `GET /api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of events currently held by the collector.
    pub total: u64,
    /// Events classified as ARP spoofing.
    pub spoofing: u64,
    /// First sightings of a device.
    pub new_devices: u64,
    /// Events where the observed MAC matched the recorded one.
    pub matches: u64,
}

/// Report counts per organization, in the order the server sent them.
///
/// Serialized as a JSON object. The order of keys is display order, so this
/// is a list of pairs rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgStats(Vec<(String, u64)>);

impl OrgStats {
    #[must_use]
    pub fn new(entries: Vec<(String, u64)>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(org, count)| (org.as_str(), *count))
    }

    /// Count one more report for `org`, appending it if it was not seen yet.
    pub fn increment(&mut self, org: &str) {
        match self.0.iter_mut().find(|(name, _)| name == org) {
            Some((_, count)) => *count += 1,
            None => self.0.push((org.to_string(), 1)),
        }
    }
}

impl Serialize for OrgStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (org, count) in &self.0 {
            map.serialize_entry(org, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrgStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrgStatsVisitor;

        impl<'de> Visitor<'de> for OrgStatsVisitor {
            type Value = OrgStats;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping organization names to report counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((org, count)) = access.next_entry::<String, u64>()? {
                    entries.push((org, count));
                }
                Ok(OrgStats(entries))
            }
        }

        deserializer.deserialize_map(OrgStatsVisitor)
    }
}

/// Category of a reported network observation.
///
/// The label doubles as a CSS class in the rendered page, so unknown labels
/// are kept verbatim but slugged by [`EventType::css_class`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// IP address claimed by a different MAC than the one on record.
    Spoofing,
    /// Device seen for the first time.
    New,
    /// Observed MAC matches the recorded one.
    Match,
    /// Any label outside the known set.
    Other(String),
}

impl EventType {
    /// Wire label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Spoofing => "spoofing",
            Self::New => "new",
            Self::Match => "match",
            Self::Other(label) => label,
        }
    }

    /// Identifier-safe class token for the rendered block.
    #[must_use]
    pub fn css_class(&self) -> String {
        match self {
            Self::Other(label) => super::render::org_slug(label),
            known => known.as_str().to_string(),
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Other(UNKNOWN_EVENT_TYPE.to_string())
    }
}

impl From<String> for EventType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "spoofing" => Self::Spoofing,
            "new" => Self::New,
            "match" => Self::Match,
            _ => Self::Other(label),
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        match kind {
            EventType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event time as sent by the reporter: epoch milliseconds or a date string.
///
/// Anything else is kept in [`Timestamp::Other`] and renders as an invalid date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(f64),
    Text(String),
    Other(Value),
}

/// One reported observation served by `GET /api/events`.
///
/// The collector stores arbitrary objects, so every field tolerates being
/// missing, `null` or of the wrong JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEvent {
    #[serde(default, deserialize_with = "lenient_event_type")]
    pub event_type: EventType,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac_address: String,
    #[serde(
        rename = "previousMAC",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_mac: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub recorded_by: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
}

/// Text form of a loosely typed field; `None` for `null`.
fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn lenient_event_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EventType, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?)
        .map(EventType::from)
        .unwrap_or_default())
}

impl NetworkEvent {
    /// Read one item of an events list, falling back to an empty event when
    /// the item is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Previous MAC, if one was reported and is non-empty.
    #[must_use]
    pub fn previous_mac(&self) -> Option<&str> {
        self.previous_mac.as_deref().filter(|mac| !mac.is_empty())
    }

    /// Hostname, if one was reported and is non-empty.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|name| !name.is_empty())
    }
}
