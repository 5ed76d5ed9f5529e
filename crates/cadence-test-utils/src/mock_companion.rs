// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock companion server for deterministic testing.

use cadence_companion::CompanionClient;
use cadence_config::model::CompanionConfig;
use cadence_core::CadenceError;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A local HTTP server answering companion endpoints with canned JSON.
pub struct MockCompanion {
    server: MockServer,
}

impl MockCompanion {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> CompanionConfig {
        CompanionConfig {
            base_url: self.uri(),
            ..CompanionConfig::default()
        }
    }

    pub fn client(&self) -> Result<CompanionClient, CadenceError> {
        CompanionClient::new(&self.config())
    }

    /// Answers POSTs to `endpoint` with 200 and `body`.
    pub async fn respond_ok(&self, endpoint: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answers POSTs to `endpoint` with `status` and an `{error}` body.
    pub async fn respond_error(&self, endpoint: &str, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": message })))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for `endpoint` so far.
    pub async fn received(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_companion::client::endpoints;

    #[tokio::test]
    async fn canned_answers_and_request_counts() {
        let mock = MockCompanion::start().await;
        mock.respond_ok(endpoints::VERIFICATION_STATUS, json!({"verified": true}))
            .await;
        mock.respond_error(endpoints::CALENDAR_STATUS, 401, "Not signed in")
            .await;

        let client = mock.client().unwrap();
        assert!(client.verification_status("a@b.co").await.unwrap());
        let err = client.calendar_status("u").await.unwrap_err();
        assert_eq!(err.user_message(), "Not signed in");
        assert_eq!(mock.received(endpoints::VERIFICATION_STATUS).await, 1);
    }
}
