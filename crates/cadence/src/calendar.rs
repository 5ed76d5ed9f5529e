// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence calendar` subcommands.

use cadence_companion::{CalendarConnector, CompanionClient};
use cadence_config::CadenceConfig;
use cadence_core::CadenceError;
use cadence_features::settings::google_calendar;
use cadence_features::AppContext;
use clap::Subcommand;

use crate::output::Printer;

#[derive(Subcommand, Debug)]
pub enum CalendarCommand {
    /// Ask the companion server whether the calendar is still connected.
    Status {
        #[arg(long)]
        user: String,
    },
    /// Print the Google consent URL to start a connection.
    AuthUrl {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "http://localhost:3000/calendar/callback")]
        redirect_uri: String,
    },
    /// Revoke access and forget the stored tokens.
    Disconnect {
        #[arg(long)]
        user: String,
    },
}

pub async fn run(
    ctx: &AppContext,
    config: &CadenceConfig,
    command: CalendarCommand,
    out: &Printer,
) -> Result<(), CadenceError> {
    let client = CompanionClient::new(&config.companion)?;
    let connector = |user: String| CalendarConnector::new(client.clone(), google_calendar(ctx), user);
    match command {
        CalendarCommand::Status { user } => {
            let calendar = connector(user);
            let connected = calendar.refresh_status().await?;
            let email = calendar.connection().email.unwrap_or_default();
            if connected {
                out.row("connected", &email);
            } else {
                out.line("not connected");
            }
        }
        CalendarCommand::AuthUrl { user, redirect_uri } => {
            out.line(&connector(user).auth_url(&redirect_uri).await?);
        }
        CalendarCommand::Disconnect { user } => {
            connector(user).disconnect().await?;
            out.success("calendar disconnected");
        }
    }
    Ok(())
}
