// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence content` subcommands.

use cadence_core::CadenceError;
use cadence_features::{AppContext, ContentCalendar, ScheduledContentItem};
use chrono::NaiveDate;
use clap::Subcommand;

use crate::output::Printer;

#[derive(Subcommand, Debug)]
pub enum ContentCommand {
    /// Add a content idea.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Target platform. Repeat for several.
        #[arg(long = "platform")]
        platforms: Vec<String>,
        #[arg(long, default_value = "")]
        format: String,
        /// Schedule it right away on this date.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List content ideas.
    List {
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        #[arg(long)]
        platform: Option<String>,
        /// Only ideas without a date.
        #[arg(long, conflicts_with_all = ["from", "platform"])]
        unscheduled: bool,
    },
    /// Put an idea on the calendar, or take it off with `--clear`.
    Schedule {
        id: String,
        #[arg(required_unless_present = "clear")]
        date: Option<NaiveDate>,
        #[arg(long, conflicts_with = "date")]
        clear: bool,
    },
}

pub fn run(ctx: &AppContext, command: ContentCommand, out: &Printer) -> Result<(), CadenceError> {
    let calendar = ContentCalendar::mount(ctx);
    match command {
        ContentCommand::Add {
            title,
            description,
            platforms,
            format,
            date,
        } => {
            let item = ScheduledContentItem {
                description,
                platforms,
                format,
                ..ScheduledContentItem::draft(title.trim())
            };
            let id = calendar.add(item)?;
            if let Some(date) = date {
                calendar.schedule(&id, date)?;
            }
            out.success(&format!("added content {id}"));
        }
        ContentCommand::List {
            from,
            to,
            platform,
            unscheduled,
        } => {
            let items = match (from, to, platform) {
                _ if unscheduled => calendar.unscheduled(),
                (Some(from), Some(to), None) => calendar.in_range(from, to),
                (Some(from), Some(to), Some(platform)) => calendar
                    .in_range(from, to)
                    .into_iter()
                    .filter(|i| i.is_on(&platform))
                    .collect(),
                (_, _, Some(platform)) => calendar.for_platform(&platform),
                _ => calendar.items(),
            };
            if items.is_empty() {
                out.line("no content");
            }
            for item in items {
                let date = item
                    .scheduled_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "----------".to_string());
                let platforms = if item.platforms.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", item.platforms.join(", "))
                };
                out.row(
                    &item.id,
                    &format!("{date} {:<9} {}{platforms}", item.status.to_string(), item.title),
                );
            }
        }
        ContentCommand::Schedule { id, date, clear } => match date {
            Some(date) if !clear => {
                calendar.schedule(&id, date)?;
                out.success(&format!("{id} scheduled for {date}"));
            }
            _ => {
                calendar.unschedule(&id)?;
                out.success(&format!("{id} unscheduled"));
            }
        },
    }
    Ok(())
}
