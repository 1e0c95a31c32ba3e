use super::traits::{PageSession, Poller};
use super::types::ReadinessPolicy;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poller backed by the tokio timer.
pub struct TokioPoller;

#[async_trait]
impl Poller for TokioPoller {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Loads a listing page and waits for the readiness marker to render.
pub struct PageLoader<'a> {
    session: &'a dyn PageSession,
    poller: &'a dyn Poller,
    policy: ReadinessPolicy,
    marker: &'a str,
}

impl<'a> PageLoader<'a> {
    pub fn new(
        session: &'a dyn PageSession,
        poller: &'a dyn Poller,
        policy: ReadinessPolicy,
        marker: &'a str,
    ) -> Self {
        Self {
            session,
            poller,
            policy,
            marker,
        }
    }

    /// Returns whether the marker showed up. A `false` result is not an
    /// error: extraction runs against whatever the page currently shows.
    pub async fn load(&self, url: &str) -> bool {
        let rounds = self.policy.reload_rounds.max(1);

        for round in 1..=rounds {
            if let Err(e) = self.session.navigate(url).await {
                warn!("Navigation round {}/{} failed: {}", round, rounds, e);
                continue;
            }

            for poll in 1..=self.policy.polls_per_round {
                if self.session.is_present(self.marker).await {
                    info!("Listing ready: {}", url);
                    return true;
                }
                debug!("Marker not present yet (round {}, poll {})", round, poll);
                self.poller.pause(self.policy.poll_interval).await;
            }

            if round < rounds {
                debug!("Reloading {}", url);
            }
        }

        warn!("Listing never became ready after {} loads: {}", rounds, url);
        false
    }
}
