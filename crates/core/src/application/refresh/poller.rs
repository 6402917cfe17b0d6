// Standing Poller - keeps the last known good snapshot current

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::teardown::TeardownToken;
use crate::domain::AccountSnapshot;
use crate::error::Result;
use crate::port::StandingProvider;

/// Fetches the account snapshot on its own schedule
///
/// Failed fetches are logged and leave the previous snapshot in place, so
/// the refresher always has something to estimate from.
pub struct StandingPoller {
    provider: Arc<dyn StandingProvider>,
    sender: watch::Sender<AccountSnapshot>,
    interval: Duration,
}

impl StandingPoller {
    /// Fetch the first snapshot and build a poller around it
    ///
    /// Fails if the first fetch fails: there is no good snapshot to fall back to.
    pub async fn bootstrap(
        provider: Arc<dyn StandingProvider>,
        interval: Duration,
    ) -> Result<(Self, watch::Receiver<AccountSnapshot>)> {
        let initial = provider.fetch().await?;
        let (sender, receiver) = watch::channel(initial);
        Ok((
            Self {
                provider,
                sender,
                interval,
            },
            receiver,
        ))
    }

    pub fn subscribe(&self) -> watch::Receiver<AccountSnapshot> {
        self.sender.subscribe()
    }

    /// Fetch once; returns true if a new snapshot was published
    pub async fn poll_once(&self) -> bool {
        match self.provider.fetch().await {
            Ok(snapshot) => {
                debug!(
                    user_id = ?snapshot.user_id,
                    in_venue = snapshot.enter_timestamp.is_some(),
                    "Standing snapshot refreshed"
                );
                self.sender.send_replace(snapshot);
                true
            }
            Err(e) => {
                warn!(error = %e, "Standing fetch failed, keeping last good snapshot");
                false
            }
        }
    }

    /// Run poll loop until teardown
    ///
    /// An in-flight fetch is abandoned on teardown.
    pub async fn run(self, mut teardown: TeardownToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Standing poller started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The bootstrap fetch already covered the immediate first tick.
        tick.tick().await;

        loop {
            if teardown.is_torn_down() {
                break;
            }

            tokio::select! {
                _ = tick.tick() => {},
                _ = teardown.torn_down() => break,
            }

            tokio::select! {
                _ = self.poll_once() => {},
                _ = teardown.torn_down() => break,
            }
        }

        info!("Standing poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh::teardown_channel;
    use crate::port::standing_provider::mocks::MockStandingProvider;
    use crate::port::ProviderError;

    fn snapshot(consumption: f64) -> AccountSnapshot {
        AccountSnapshot {
            enter_timestamp: Some(0),
            consumption: Some(consumption),
            discount: Some(1.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bootstrap_fails_without_first_snapshot() {
        let provider = Arc::new(MockStandingProvider::scripted(vec![Err(
            ProviderError::Unavailable("offline".to_string()),
        )]));
        let result = StandingPoller::bootstrap(provider, Duration::from_secs(30)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_last_good_snapshot() {
        let provider = Arc::new(MockStandingProvider::scripted(vec![
            Ok(snapshot(10.0)),
            Err(ProviderError::Unavailable("timeout".to_string())),
            Ok(snapshot(30.0)),
        ]));
        let (poller, rx) = StandingPoller::bootstrap(provider.clone(), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(rx.borrow().consumption, Some(10.0));

        assert!(!poller.poll_once().await);
        assert_eq!(rx.borrow().consumption, Some(10.0));

        assert!(poller.poll_once().await);
        assert_eq!(rx.borrow().consumption, Some(30.0));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_subscribe_shares_published_snapshot() {
        let provider = Arc::new(MockStandingProvider::scripted(vec![
            Ok(snapshot(10.0)),
            Ok(snapshot(40.0)),
        ]));
        let (poller, _rx) = StandingPoller::bootstrap(provider, Duration::from_secs(30))
            .await
            .unwrap();
        let mut late = poller.subscribe();
        assert_eq!(late.borrow_and_update().consumption, Some(10.0));

        assert!(poller.poll_once().await);
        assert!(late.has_changed().unwrap());
        assert_eq!(late.borrow_and_update().consumption, Some(40.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_until_teardown() {
        let provider = Arc::new(MockStandingProvider::scripted(vec![
            Ok(snapshot(10.0)),
            Ok(snapshot(20.0)),
        ]));
        let (poller, mut rx) = StandingPoller::bootstrap(provider.clone(), Duration::from_secs(30))
            .await
            .unwrap();
        let (view, token) = teardown_channel();
        let handle = tokio::spawn(poller.run(token));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().consumption, Some(20.0));

        view.teardown();
        handle.await.unwrap();
        assert!(provider.call_count() >= 2);
    }
}
