// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Calendar connection kept in the local settings store.

use cadence_core::CadenceError;
use cadence_features::settings::{GoogleCalendarConnection, Setting};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::client::CompanionClient;
use crate::guard::InFlightGuard;
use crate::types::CalendarEvent;

/// Connects, queries, and disconnects the user's Google Calendar.
pub struct CalendarConnector {
    client: CompanionClient,
    connection: Setting<GoogleCalendarConnection>,
    user_id: String,
    in_flight: InFlightGuard,
}

impl CalendarConnector {
    pub fn new(
        client: CompanionClient,
        connection: Setting<GoogleCalendarConnection>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            connection,
            user_id: user_id.into(),
            in_flight: InFlightGuard::new(),
        }
    }

    pub fn connection(&self) -> GoogleCalendarConnection {
        self.connection.get()
    }

    /// URL of the consent screen to send the user to.
    pub async fn auth_url(&self, redirect_uri: &str) -> Result<String, CadenceError> {
        self.client.calendar_auth_url(&self.user_id, redirect_uri).await
    }

    /// Trades an OAuth code for tokens and stores them.
    pub async fn connect(
        &self,
        code: &str,
        redirect_uri: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CadenceError> {
        if code.trim().is_empty() {
            return Err(CadenceError::Validation("missing authorization code".into()));
        }
        self.in_flight
            .run(async {
                let tokens = self.client.exchange_calendar_code(code, redirect_uri).await?;
                let previous = self.connection.get();
                self.connection.save(GoogleCalendarConnection {
                    connected: true,
                    email: tokens.email.or(previous.email),
                    access_token: Some(tokens.access_token),
                    // Google only sends a refresh token on first consent.
                    refresh_token: tokens.refresh_token.or(previous.refresh_token),
                    expires_at: Some(now + Duration::seconds(tokens.expires_in)),
                    calendar_ids: previous.calendar_ids,
                })?;
                info!("google calendar connected");
                Ok(())
            })
            .await
    }

    /// Events between `from` and `to`. Requires a live access token.
    pub async fn events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CadenceError> {
        let connection = self.connection.get();
        if !connection.connected || connection.is_expired(now) {
            return Err(CadenceError::Validation(
                "Google Calendar is not connected, please reconnect".into(),
            ));
        }
        let token = connection.access_token.unwrap_or_default();
        self.client.calendar_events(&token, from, to).await
    }

    /// Asks the server whether the connection is still alive and mirrors
    /// the answer locally.
    pub async fn refresh_status(&self) -> Result<bool, CadenceError> {
        let status = self.client.calendar_status(&self.user_id).await?;
        let mut connection = self.connection.get();
        if connection.connected != status.connected {
            connection.connected = status.connected;
            if status.email.is_some() {
                connection.email = status.email;
            }
            self.connection.save(connection)?;
        }
        Ok(status.connected)
    }

    /// Revokes server-side access and forgets local tokens.
    ///
    /// Local tokens are dropped even if the server call fails.
    pub async fn disconnect(&self) -> Result<(), CadenceError> {
        let remote = self.client.calendar_disconnect(&self.user_id).await;
        self.connection.save(GoogleCalendarConnection::default())?;
        if let Err(e) = &remote {
            warn!(error = %e, "server-side calendar disconnect failed");
        }
        remote
    }
}
