//! Periodic fetch-and-render loop.
//!
//! One cycle fetches the event list, renders it, then refreshes the stats and
//! org-stats panels concurrently. Every endpoint's failure is logged and
//! contained; the other regions and later cycles are unaffected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use super::client::Backend;
use super::document::{
    Document, EVENTS_LIST, ORG_STATS_CONTAINER, STAT_MATCH, STAT_NEW, STAT_SPOOFING, STAT_TOTAL,
};
use super::error::DashboardError;
use super::model::{OrgStats, StatsSummary};
use super::render::{render_events, render_org_stats};

/// Default period between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Stat regions in the order [`StatsSummary`] fields are written.
const STAT_REGIONS: [&str; 4] = [STAT_TOTAL, STAT_SPOOFING, STAT_NEW, STAT_MATCH];

/// Shortest period accepted by [`DashboardPoller::start`].
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Fetches dashboard data from a [`Backend`] and renders it into a [`Document`].
#[derive(Clone)]
pub struct DashboardPoller {
    backend: Arc<dyn Backend>,
    document: Arc<dyn Document>,
    cycles: Arc<AtomicU64>,
}

impl DashboardPoller {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, document: Arc<dyn Document>) -> Self {
        Self {
            backend,
            document,
            cycles: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of cycles started so far.
    #[must_use]
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Fetch the counters and write them into the four stat regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or any stat region is missing. In
    /// either case no region is touched.
    pub async fn try_load_stats(&self) -> Result<StatsSummary, DashboardError> {
        let stats = self.backend.stats().await?;
        self.document.require_regions(&STAT_REGIONS)?;
        let values = [stats.total, stats.spoofing, stats.new_devices, stats.matches];
        for (id, value) in STAT_REGIONS.into_iter().zip(values) {
            self.document.set_text(id, &value.to_string())?;
        }
        Ok(stats)
    }

    /// [`Self::try_load_stats`], logging instead of returning the error.
    pub async fn load_stats(&self) {
        if let Err(e) = self.try_load_stats().await {
            tracing::error!(error = %e, "Error loading stats");
        }
    }

    /// Fetch per-organization counts and render them as cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the region is missing.
    pub async fn try_load_org_stats(&self) -> Result<OrgStats, DashboardError> {
        let org_stats = self.backend.org_stats().await?;
        self.document
            .set_inner_html(ORG_STATS_CONTAINER, &render_org_stats(&org_stats))?;
        Ok(org_stats)
    }

    /// [`Self::try_load_org_stats`], logging instead of returning the error.
    pub async fn load_org_stats(&self) {
        if let Err(e) = self.try_load_org_stats().await {
            tracing::error!(error = %e, "Error loading org stats");
        }
    }

    /// Fetch the event list and render it in server order.
    ///
    /// Returns the number of events rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the region is missing.
    pub async fn try_load_events(&self) -> Result<usize, DashboardError> {
        let events = self.backend.events().await?;
        self.document
            .set_inner_html(EVENTS_LIST, &render_events(&events))?;
        Ok(events.len())
    }

    /// Refresh the event list, then both summary panels.
    ///
    /// The summary panels are refreshed whether or not the events step
    /// succeeded.
    pub async fn load_events(&self) {
        match self.try_load_events().await {
            Ok(count) => tracing::debug!(events = count, "Events rendered"),
            Err(e) => tracing::error!(error = %e, "Error loading events"),
        }
        tokio::join!(self.load_stats(), self.load_org_stats());
    }

    /// Run one numbered cycle inside its own tracing span.
    pub async fn run_cycle(&self) {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let span = tracing::debug_span!("cycle", cycle);
        async {
            tracing::debug!("Cycle started");
            self.load_events().await;
        }
        .instrument(span)
        .await;
    }

    /// Run a cycle now and then once per `interval` until the handle is stopped
    /// or dropped.
    ///
    /// A new cycle starts on every tick even if earlier ones are still in
    /// flight. Must be called from within a tokio runtime.
    #[must_use = "dropping the handle stops the poller"]
    pub fn start(self, interval: Duration) -> PollerHandle {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        tracing::info!(interval_ms = interval.as_millis(), "Starting dashboard poller");
        let timer = tokio::spawn(run_timer(self, interval, cancel.clone(), tracker.clone()));

        PollerHandle {
            cancel,
            tracker,
            timer,
        }
    }
}

async fn run_timer(
    poller: DashboardPoller,
    interval: Duration,
    cancel: CancellationToken,
    tracker: TaskTracker,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let poller = poller.clone();
                tracker.spawn(async move { poller.run_cycle().await });
            }
        }
    }
    tracing::debug!("Poller timer stopped");
}

/// Owned handle to a running [`DashboardPoller`].
///
/// Dropping the handle stops the timer; cycles already in flight run to
/// completion in the background.
pub struct PollerHandle {
    cancel: CancellationToken,
    tracker: TaskTracker,
    timer: JoinHandle<()>,
}

impl PollerHandle {
    /// Whether the timer is still scheduling cycles.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.timer.is_finished()
    }

    /// Number of cycles that have started but not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop scheduling cycles and wait for the ones in flight to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.timer).await {
            tracing::warn!(error = %e, "Poller timer task failed");
        }
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("Dashboard poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
