//! Live dashboard: polls the collector and renders its data as HTML regions.

mod client;
mod document;
mod error;
mod model;
mod page;
mod poller;
pub mod render;

pub use client::{Backend, FetchError, HttpBackend, EVENTS_PATH, ORG_STATS_PATH, STATS_PATH};
pub use document::{
    Document, DocumentError, MemoryDocument, PageDocument, EVENTS_LIST, ORG_STATS_CONTAINER,
    REGION_IDS, STAT_MATCH, STAT_NEW, STAT_SPOOFING, STAT_TOTAL,
};
pub use error::DashboardError;
pub use model::{EventType, NetworkEvent, OrgStats, StatsSummary, Timestamp, UNKNOWN_EVENT_TYPE};
pub use page::render_page;
pub use poller::{DashboardPoller, PollerHandle, DEFAULT_POLL_INTERVAL};
