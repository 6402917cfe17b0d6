// Refresh - periodic recomputation of a live estimate

pub mod constants;
mod poller;
mod teardown;

pub use poller::StandingPoller;
pub use teardown::{teardown_channel, TeardownToken, ViewHandle};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::application::estimator::EstimatorService;
use crate::domain::{AccountSnapshot, CostEstimate};

/// Latest value a live surface should render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum LiveEstimate {
    /// Nothing computed yet
    Pending,
    /// Member is not (or no longer) in the venue
    Closed,
    Open(CostEstimate),
    /// Inputs were invalid; the reason is shown instead of a number
    Rejected(String),
}

/// Why a refresh loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshExit {
    TornDown,
    SessionClosed,
    NoSubscribers,
}

/// Re-runs the estimator on a fixed interval while a session is open
///
/// Holds no billing logic: each tick reads the last known standing snapshot
/// (never waiting on a fetch), reads the injected clock, and publishes a
/// whole new [`LiveEstimate`].
pub struct LiveEstimateRefresher {
    service: Arc<EstimatorService>,
    standing: watch::Receiver<AccountSnapshot>,
    publisher: watch::Sender<LiveEstimate>,
    interval: Duration,
}

impl LiveEstimateRefresher {
    /// Create a refresher and the receiver surfaces read from
    ///
    /// # Arguments
    /// * `service` - Shared estimator service (owns the clock)
    /// * `standing` - Latest account snapshot, fed by a poller or the host
    /// * `interval` - Recompute period (default: 60s)
    pub fn new(
        service: Arc<EstimatorService>,
        standing: watch::Receiver<AccountSnapshot>,
        interval: Duration,
    ) -> (Self, watch::Receiver<LiveEstimate>) {
        let (publisher, receiver) = watch::channel(LiveEstimate::Pending);
        (
            Self {
                service,
                standing,
                publisher,
                interval,
            },
            receiver,
        )
    }

    /// Additional receiver for another surface
    pub fn subscribe(&self) -> watch::Receiver<LiveEstimate> {
        self.publisher.subscribe()
    }

    /// Compute and publish one estimate from the current snapshot
    pub fn refresh_once(&self) -> LiveEstimate {
        let snapshot = self.standing.borrow().clone();

        let next = match self.service.estimate_snapshot(&snapshot) {
            Ok(Some(estimate)) => LiveEstimate::Open(estimate),
            Ok(None) => LiveEstimate::Closed,
            Err(e) => {
                warn!(
                    user_id = ?snapshot.user_id,
                    error = %e,
                    "Live estimate rejected"
                );
                LiveEstimate::Rejected(e.to_string())
            }
        };

        self.publisher.send_replace(next.clone());
        next
    }

    /// Run refresh loop until teardown, session close, or no subscribers left
    ///
    /// The first tick fires immediately. Should be spawned in tokio::spawn.
    pub async fn run(self, mut teardown: TeardownToken) -> RefreshExit {
        info!(
            interval_secs = self.interval.as_secs(),
            "Live estimate refresher started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let exit = loop {
            if teardown.is_torn_down() {
                break RefreshExit::TornDown;
            }

            tokio::select! {
                _ = tick.tick() => {},
                _ = teardown.torn_down() => {
                    break RefreshExit::TornDown;
                }
            }

            if teardown.is_torn_down() {
                break RefreshExit::TornDown;
            }
            if self.publisher.is_closed() {
                break RefreshExit::NoSubscribers;
            }

            match self.refresh_once() {
                LiveEstimate::Closed => break RefreshExit::SessionClosed,
                LiveEstimate::Open(estimate) => {
                    info!(
                        elapsed = %estimate.elapsed_label,
                        amount_due = estimate.amount_due,
                        "Live estimate refreshed"
                    );
                }
                _ => {}
            }
        };

        info!(reason = ?exit, "Live estimate refresher stopped");
        exit
    }
}
