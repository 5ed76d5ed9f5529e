// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the companion server.
//!
//! Every endpoint is a JSON POST. A non-2xx response becomes
//! [`CadenceError::Api`] carrying the server's `{error}` text, ready to show
//! to the user. Nothing is retried.

use std::time::Duration;

use cadence_config::model::CompanionConfig;
use cadence_core::CadenceError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::*;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Companion server endpoints, relative to the base URL.
pub mod endpoints {
    pub const CREATE_CUSTOMER: &str = "/api/stripe/create-customer";
    pub const ATTACH_PAYMENT_METHOD: &str = "/api/stripe/attach-payment-method";
    pub const CREATE_SUBSCRIPTION: &str = "/api/stripe/create-subscription";
    pub const CREATE_PORTAL_SESSION: &str = "/api/stripe/create-portal-session";
    pub const VERIFICATION_STATUS: &str = "/api/auth/verification-status";
    pub const CALENDAR_AUTH_URL: &str = "/api/google-calendar/auth-url";
    pub const CALENDAR_EXCHANGE_TOKEN: &str = "/api/google-calendar/exchange-token";
    pub const CALENDAR_EVENTS: &str = "/api/google-calendar/events";
    pub const CALENDAR_STATUS: &str = "/api/google-calendar/status";
    pub const CALENDAR_DISCONNECT: &str = "/api/google-calendar/disconnect";
}

/// Client for the billing and calendar proxy.
#[derive(Debug, Clone)]
pub struct CompanionClient {
    client: reqwest::Client,
    base_url: String,
}

impl CompanionClient {
    pub fn new(config: &CompanionConfig) -> Result<Self, CadenceError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CadenceError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON answer.
    pub async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, CadenceError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CadenceError::Http {
                message: format!("request to {path} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, path, "companion response received");

        let text = response.text().await.map_err(|e| CadenceError::Http {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(body) => body.error,
                Err(_) if text.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => text,
            };
            warn!(%status, path, %message, "companion request rejected");
            return Err(CadenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Some endpoints answer 200 with an empty body.
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| CadenceError::Http {
            message: format!("failed to parse response from {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    // --- Billing ---

    pub async fn create_customer(
        &self,
        request: &CreateCustomerRequest,
    ) -> Result<String, CadenceError> {
        let response: CreateCustomerResponse =
            self.post(endpoints::CREATE_CUSTOMER, request).await?;
        Ok(response.customer_id)
    }

    pub async fn attach_payment_method(
        &self,
        request: &AttachPaymentMethodRequest,
    ) -> Result<(), CadenceError> {
        let _: Ack = self.post(endpoints::ATTACH_PAYMENT_METHOD, request).await?;
        Ok(())
    }

    pub async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<Subscription, CadenceError> {
        self.post(endpoints::CREATE_SUBSCRIPTION, request).await
    }

    /// Billing portal URL for an existing customer.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, CadenceError> {
        let response: UrlResponse = self
            .post(
                endpoints::CREATE_PORTAL_SESSION,
                &PortalSessionRequest {
                    customer_id: customer_id.to_string(),
                    return_url: return_url.to_string(),
                },
            )
            .await?;
        Ok(response.url)
    }

    pub async fn verification_status(&self, email: &str) -> Result<bool, CadenceError> {
        let status: VerificationStatus = self
            .post(
                endpoints::VERIFICATION_STATUS,
                &VerificationStatusRequest {
                    email: email.to_string(),
                },
            )
            .await?;
        Ok(status.verified)
    }

    // --- Google Calendar ---

    pub async fn calendar_auth_url(
        &self,
        user_id: &str,
        redirect_uri: &str,
    ) -> Result<String, CadenceError> {
        let response: UrlResponse = self
            .post(
                endpoints::CALENDAR_AUTH_URL,
                &AuthUrlRequest {
                    user_id: user_id.to_string(),
                    redirect_uri: redirect_uri.to_string(),
                },
            )
            .await?;
        Ok(response.url)
    }

    pub async fn exchange_calendar_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenExchangeResponse, CadenceError> {
        self.post(
            endpoints::CALENDAR_EXCHANGE_TOKEN,
            &TokenExchangeRequest {
                code: code.to_string(),
                redirect_uri: redirect_uri.to_string(),
            },
        )
        .await
    }

    pub async fn calendar_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CadenceError> {
        let response: EventsResponse = self
            .post(
                endpoints::CALENDAR_EVENTS,
                &EventsRequest {
                    access_token: access_token.to_string(),
                    time_min,
                    time_max,
                },
            )
            .await?;
        Ok(response.events)
    }

    pub async fn calendar_status(&self, user_id: &str) -> Result<CalendarStatus, CadenceError> {
        self.post(
            endpoints::CALENDAR_STATUS,
            &UserRequest {
                user_id: user_id.to_string(),
            },
        )
        .await
    }

    pub async fn calendar_disconnect(&self, user_id: &str) -> Result<(), CadenceError> {
        let _: Ack = self
            .post(
                endpoints::CALENDAR_DISCONNECT,
                &UserRequest {
                    user_id: user_id.to_string(),
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> CompanionClient {
        CompanionClient::new(&CompanionConfig {
            base_url: format!("{base_url}/"),
            ..CompanionConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_customer_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CREATE_CUSTOMER))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "userId": "user_1", "email": "a@b.co", "name": "Ada"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"customerId": "cus_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let id = client
            .create_customer(&CreateCustomerRequest {
                user_id: "user_1".into(),
                email: "a@b.co".into(),
                name: "Ada".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, "cus_1");
    }

    #[tokio::test]
    async fn error_body_becomes_api_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CREATE_PORTAL_SESSION))
            .respond_with(
                ResponseTemplate::new(402).set_body_json(json!({"error": "Card declined"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .create_portal_session("cus_1", "https://app/settings")
            .await
            .unwrap_err();
        match err {
            CadenceError::Api { status, message } => {
                assert_eq!(status, 402);
                assert_eq!(message, "Card declined");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_keeps_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CALENDAR_STATUS))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.calendar_status("u").await.unwrap_err();
        assert!(matches!(err, CadenceError::Api { status: 502, ref message } if message == "Bad gateway"));
        assert_eq!(err.user_message(), "Bad gateway");
    }

    #[tokio::test]
    async fn empty_success_body_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CALENDAR_DISCONNECT))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.calendar_disconnect("u").await.unwrap();
    }

    #[tokio::test]
    async fn events_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CALENDAR_EVENTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [{
                    "id": "ev1",
                    "summary": "Brand call",
                    "start": "2026-05-01T15:00:00Z",
                    "end": "2026-05-01T15:30:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let now = Utc::now();
        let events = client
            .calendar_events("tok", now, now + chrono::Duration::days(7))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Brand call");
    }

    #[tokio::test]
    async fn malformed_success_body_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(endpoints::CALENDAR_AUTH_URL))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.calendar_auth_url("u", "http://cb").await.unwrap_err();
        assert!(matches!(err, CadenceError::Http { .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        // Port 9 (discard) is closed on test machines.
        let client = test_client("http://127.0.0.1:9");
        let err = client.verification_status("a@b.co").await.unwrap_err();
        assert!(matches!(err, CadenceError::Http { .. }));
    }
}
