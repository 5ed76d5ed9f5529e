// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded polling for email-verification status.

use std::time::Duration;

use cadence_config::model::CompanionConfig;
use cadence_core::CadenceError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::CompanionClient;

/// How a verification wait ended, other than by running out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified { attempts: u32 },
    Cancelled,
}

/// Shortest interval between checks.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Re-checks verification status at a fixed interval, a bounded number of times.
#[derive(Debug, Clone, Copy)]
pub struct VerificationPoller {
    interval: Duration,
    max_attempts: u32,
}

impl VerificationPoller {
    /// Intervals shorter than a millisecond are raised to one.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            max_attempts,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn from_config(config: &CompanionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.verification_poll_secs),
            config.verification_max_attempts,
        )
    }

    /// Polls until `email` is verified, `cancel` fires, or attempts run out.
    ///
    /// The first check happens immediately. Failed checks are logged and
    /// count as an attempt. Running out of attempts is a
    /// [`CadenceError::Timeout`].
    pub async fn wait(
        &self,
        client: &CompanionClient,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<VerificationOutcome, CadenceError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=self.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempt, "verification polling cancelled");
                    return Ok(VerificationOutcome::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            match client.verification_status(email).await {
                Ok(true) => {
                    info!(attempt, "email verified");
                    return Ok(VerificationOutcome::Verified { attempts: attempt });
                }
                Ok(false) => debug!(attempt, "email not verified yet"),
                Err(e) => warn!(attempt, error = %e, "verification check failed"),
            }
        }

        Err(CadenceError::Timeout {
            duration: self.interval * self.max_attempts.saturating_sub(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::endpoints;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CompanionClient {
        CompanionClient::new(&CompanionConfig {
            base_url: server.uri(),
            ..CompanionConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn stops_as_soon_as_verified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let poller = VerificationPoller::new(Duration::from_millis(10), 10);
        let outcome = poller
            .wait(&client, "a@b.co", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, VerificationOutcome::Verified { attempts: 3 });
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "down"})))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let poller = VerificationPoller::new(Duration::from_millis(10), 3);
        let err = poller
            .wait(&client, "a@b.co", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CadenceError::Timeout { duration } if duration == Duration::from_millis(20)));
        assert!(logs_contain("verification check failed"));
    }

    #[tokio::test]
    async fn cancellation_ends_the_wait() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let poller = VerificationPoller::new(Duration::from_secs(5), 10);
        let outcome = poller.wait(&client, "a@b.co", &cancel).await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Cancelled);
    }

    #[test]
    fn defaults_come_from_config() {
        let poller = VerificationPoller::from_config(&CompanionConfig::default());
        assert_eq!(poller.interval, Duration::from_secs(5));
        assert_eq!(poller.max_attempts, 60);
    }

    #[tokio::test]
    async fn zero_interval_still_polls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(endpoints::VERIFICATION_STATUS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let poller = VerificationPoller::new(Duration::ZERO, 5);
        assert_eq!(poller.interval(), MIN_INTERVAL);
        let outcome = poller
            .wait(&client, "a@b.co", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, VerificationOutcome::Verified { attempts: 2 });
    }
}
