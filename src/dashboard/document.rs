//! Display regions the poller writes into.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::page::render_page;
use super::render::escape_html;

pub const STAT_TOTAL: &str = "stat-total";
pub const STAT_SPOOFING: &str = "stat-spoofing";
pub const STAT_NEW: &str = "stat-new";
pub const STAT_MATCH: &str = "stat-match";
pub const ORG_STATS_CONTAINER: &str = "org-stats-container";
pub const EVENTS_LIST: &str = "events-list";

/// Every region the poller expects to exist before its first cycle.
pub const REGION_IDS: [&str; 6] = [
    STAT_TOTAL,
    STAT_SPOOFING,
    STAT_NEW,
    STAT_MATCH,
    ORG_STATS_CONTAINER,
    EVENTS_LIST,
];

/// Errors raised while writing a region.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    /// The document has no region with this identifier.
    #[error("No region with id '{0}'")]
    MissingRegion(String),

    /// The rendered page could not be written out.
    #[error("Failed to write page {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A page made of identified regions whose content is replaced wholesale.
pub trait Document: Send + Sync {
    /// Replace a region's content with plain text.
    ///
    /// # Errors
    ///
    /// Returns an error if the region does not exist or the write fails.
    fn set_text(&self, id: &str, text: &str) -> Result<(), DocumentError>;

    /// Replace a region's content with markup.
    ///
    /// # Errors
    ///
    /// Returns an error if the region does not exist or the write fails.
    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), DocumentError>;

    /// Whether a region with this identifier exists.
    fn has_region(&self, id: &str) -> bool;

    /// Fail with [`DocumentError::MissingRegion`] for the first absent id.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first identifier with no region.
    fn require_regions(&self, ids: &[&str]) -> Result<(), DocumentError> {
        match ids.iter().find(|id| !self.has_region(id)) {
            Some(id) => Err(DocumentError::MissingRegion((*id).to_string())),
            None => Ok(()),
        }
    }
}

/// In-memory regions, each holding its current markup.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    regions: Mutex<HashMap<String, String>>,
}

impl MemoryDocument {
    /// Document with the given regions, all empty.
    #[must_use]
    pub fn with_regions<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let regions = ids.into_iter().map(|id| (id.to_string(), String::new())).collect();
        Self {
            regions: Mutex::new(regions),
        }
    }

    /// Document with every dashboard region.
    #[must_use]
    pub fn dashboard() -> Self {
        Self::with_regions(REGION_IDS)
    }

    /// Current markup of a region.
    #[must_use]
    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    /// Snapshot of every region.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Region writes are single assignments, so a poisoned map is still consistent.
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, id: &str, html: String) -> Result<(), DocumentError> {
        let mut regions = self.lock();
        let slot = regions
            .get_mut(id)
            .ok_or_else(|| DocumentError::MissingRegion(id.to_string()))?;
        *slot = html;
        tracing::trace!(region = id, "Region replaced");
        Ok(())
    }
}

impl Document for MemoryDocument {
    fn set_text(&self, id: &str, text: &str) -> Result<(), DocumentError> {
        self.replace(id, escape_html(text))
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), DocumentError> {
        self.replace(id, html.to_string())
    }

    fn has_region(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }
}

/// Regions backed by an HTML file that is rewritten after every change.
#[derive(Debug)]
pub struct PageDocument {
    regions: MemoryDocument,
    path: PathBuf,
    refresh_secs: u64,
    /// Held from snapshot to rename so concurrent writers never share the temp file.
    flush_lock: Mutex<()>,
}

impl PageDocument {
    /// Page file at `path`; browsers viewing it reload every `refresh_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial, empty page cannot be written.
    pub fn create(path: impl Into<PathBuf>, refresh_secs: u64) -> Result<Self, DocumentError> {
        let document = Self {
            regions: MemoryDocument::dashboard(),
            path: path.into(),
            refresh_secs,
            flush_lock: Mutex::new(()),
        };
        document.flush()?;
        Ok(document)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn regions(&self) -> &MemoryDocument {
        &self.regions
    }

    fn flush(&self) -> Result<(), DocumentError> {
        let _guard = self.flush_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let html = render_page(&self.regions.snapshot(), Some(self.refresh_secs));
        let tmp = self.path.with_extension("html.tmp");
        let io_err = |source| DocumentError::Io {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, html).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl Document for PageDocument {
    fn set_text(&self, id: &str, text: &str) -> Result<(), DocumentError> {
        self.regions.set_text(id, text)?;
        self.flush()
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<(), DocumentError> {
        self.regions.set_inner_html(id, html)?;
        self.flush()
    }

    fn has_region(&self, id: &str) -> bool {
        self.regions.has_region(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_document_has_every_region() {
        let document = MemoryDocument::dashboard();
        for id in REGION_IDS {
            assert_eq!(document.inner_html(id), Some(String::new()));
        }
    }

    #[test]
    fn test_set_text_escapes() {
        let document = MemoryDocument::dashboard();
        document.set_text(STAT_TOTAL, "<5>").unwrap();
        assert_eq!(document.inner_html(STAT_TOTAL).unwrap(), "&lt;5&gt;");
    }

    #[test]
    fn test_set_inner_html_replaces_wholesale() {
        let document = MemoryDocument::dashboard();
        document.set_inner_html(EVENTS_LIST, "<div>a</div>").unwrap();
        document.set_inner_html(EVENTS_LIST, "<div>b</div>").unwrap();
        assert_eq!(document.inner_html(EVENTS_LIST).unwrap(), "<div>b</div>");
    }

    #[test]
    fn test_missing_region() {
        let document = MemoryDocument::with_regions([STAT_TOTAL]);
        let err = document.set_text(EVENTS_LIST, "x").unwrap_err();
        assert!(matches!(err, DocumentError::MissingRegion(ref id) if id == EVENTS_LIST));
        assert_eq!(err.to_string(), "No region with id 'events-list'");
    }

    #[test]
    fn test_page_document_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        let document = PageDocument::create(&path, 2).unwrap();

        let initial = std::fs::read_to_string(&path).unwrap();
        assert!(initial.contains(r#"id="stat-total""#));

        document.set_text(STAT_SPOOFING, "42").unwrap();
        let updated = std::fs::read_to_string(document.path()).unwrap();
        assert!(updated.contains(r#"<div class="stat-value" id="stat-spoofing">42</div>"#));
        assert!(!dir.path().join("dashboard.html.tmp").exists());
    }

    #[test]
    fn test_require_regions_names_first_missing() {
        let document = MemoryDocument::with_regions([STAT_TOTAL, STAT_NEW]);
        assert!(document.has_region(STAT_NEW));
        assert!(document.require_regions(&[STAT_TOTAL, STAT_NEW]).is_ok());
        let err = document
            .require_regions(&[STAT_TOTAL, STAT_SPOOFING, STAT_MATCH])
            .unwrap_err();
        assert!(matches!(err, DocumentError::MissingRegion(ref id) if id == STAT_SPOOFING));
    }

    #[test]
    fn test_page_document_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        let document = PageDocument::create(&path, 2).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|worker| {
                    let document = &document;
                    scope.spawn(move || {
                        let id = REGION_IDS[worker % REGION_IDS.len()];
                        (0..100)
                            .filter(|i| document.set_text(id, &i.to_string()).is_err())
                            .count()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 0, "a flush failed");
            }
        });

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.trim_end().ends_with("</html>"));
        assert!(page.contains(r#"<div class="stat-value" id="stat-total">99</div>"#));
        assert!(!dir.path().join("dashboard.html.tmp").exists());
    }

    #[test]
    fn test_page_document_unwritable_path() {
        let err = PageDocument::create("/nonexistent-dir/sub/dashboard.html", 2).unwrap_err();
        assert!(err.to_string().contains("Failed to write page"));
    }
}
