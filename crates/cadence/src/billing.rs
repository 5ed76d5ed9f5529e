// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence billing` and `cadence verify`.

use cadence_companion::{Billing, CompanionClient, VerificationOutcome, VerificationPoller};
use cadence_config::CadenceConfig;
use cadence_core::CadenceError;
use clap::Subcommand;
use tokio_util::sync::CancellationToken;

use crate::output::Printer;

#[derive(Subcommand, Debug)]
pub enum BillingCommand {
    /// Print a billing portal URL for an existing customer.
    Portal {
        customer_id: String,
        #[arg(long, default_value = "http://localhost:3000/settings")]
        return_url: String,
    },
}

pub async fn run(
    config: &CadenceConfig,
    command: BillingCommand,
    out: &Printer,
) -> Result<(), CadenceError> {
    let billing = Billing::new(CompanionClient::new(&config.companion)?);
    match command {
        BillingCommand::Portal {
            customer_id,
            return_url,
        } => {
            out.line(&billing.portal(&customer_id, &return_url).await?);
        }
    }
    Ok(())
}

/// Waits for `email` to be verified, or until ctrl-c.
pub async fn run_verify(
    config: &CadenceConfig,
    email: &str,
    out: &Printer,
) -> Result<(), CadenceError> {
    let client = CompanionClient::new(&config.companion)?;
    let poller = VerificationPoller::from_config(&config.companion);
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });
    let outcome = poller.wait(&client, email, &cancel).await;
    ctrl_c.abort();

    match outcome? {
        VerificationOutcome::Verified { attempts } => {
            out.success(&format!("{email} verified after {attempts} checks"));
        }
        VerificationOutcome::Cancelled => out.line("stopped waiting"),
    }
    Ok(())
}
