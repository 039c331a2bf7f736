//! Event collector: receives detection reports and serves them to dashboards.

mod api;
mod error;
mod handlers;
mod server;
mod store;

pub use api::{EventResponse, EventsQuery};
pub use error::CollectorError;
pub use handlers::AppState;
pub use server::CollectorServer;
pub use store::{EventStore, UNKNOWN_ORG};
