//! Dashboard error types.

use super::client::FetchError;
use super::document::DocumentError;

/// Errors from one fetch-and-render step.
#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    /// The backend request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The rendered markup could not be written.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
