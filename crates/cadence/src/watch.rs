// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence watch`: report writes made by other processes.

use std::time::Duration;

use cadence_config::CadenceConfig;
use cadence_core::{CadenceError, Topic};
use cadence_features::AppContext;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output::Printer;

/// Polls the change log and prints each foreign write until ctrl-c.
pub async fn run_watch(
    ctx: &AppContext,
    config: &CadenceConfig,
    out: &Printer,
) -> Result<(), CadenceError> {
    let _subscriptions: Vec<_> = Topic::iter()
        .map(|topic| {
            ctx.channels.storage.on(topic, move |event| {
                let size = event.new_value.as_ref().map_or(0, String::len);
                println!("{} {} ({size} bytes) from {}", topic, event.key, event.origin);
            })
        })
        .collect();

    let cancel = CancellationToken::new();
    let interval = Duration::from_millis(config.sync.poll_interval_ms);
    let handle = ctx.start_watcher(interval, cancel.clone())?;
    out.heading(&format!("watching {} (ctrl-c to stop)", config.storage.database_path));
    info!(interval_ms = config.sync.poll_interval_ms, "watch started");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CadenceError::Internal(format!("failed to listen for ctrl-c: {e}")))?;
    cancel.cancel();
    handle
        .await
        .map_err(|e| CadenceError::Internal(format!("watcher task failed: {e}")))?;
    info!("watch stopped");
    Ok(())
}
