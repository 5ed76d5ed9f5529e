// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence planner` subcommands.

use cadence_core::CadenceError;
use cadence_features::{AppContext, Planner, PlannerDay, PlannerItem};
use chrono::NaiveDate;
use clap::Subcommand;

use crate::output::{checkbox, Printer};

#[derive(Subcommand, Debug)]
pub enum PlannerCommand {
    /// Add an item to a day.
    Add {
        /// Day, as YYYY-MM-DD.
        date: NaiveDate,
        text: String,
        /// Start time, HH:MM.
        #[arg(long)]
        start: Option<String>,
        /// End time, HH:MM.
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Show planner days.
    List {
        /// Only this day.
        #[arg(long, conflicts_with = "week")]
        date: Option<NaiveDate>,
        /// Seven days starting at this date.
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Move an item to another day or position.
    Move {
        from: NaiveDate,
        id: String,
        to: NaiveDate,
        /// Position on the target day. Defaults to the end.
        #[arg(long)]
        index: Option<usize>,
    },
    /// Repair out-of-range or too-short item times.
    Sanitize,
}

pub fn run(ctx: &AppContext, command: PlannerCommand, out: &Printer) -> Result<(), CadenceError> {
    let planner = Planner::mount(ctx);
    match command {
        PlannerCommand::Add {
            date,
            text,
            start,
            end,
            color,
        } => {
            let id = planner.add_item(
                date,
                PlannerItem {
                    text,
                    start_time: start,
                    end_time: end,
                    color,
                    ..PlannerItem::default()
                },
            )?;
            out.success(&format!("added planner item {id}"));
        }
        PlannerCommand::List { date, week } => {
            let days = match (date, week) {
                (Some(date), _) => vec![planner.day(date).unwrap_or_else(|| PlannerDay::new(date))],
                (None, Some(start)) => planner.week(start),
                (None, None) => planner.days(),
            };
            if days.is_empty() {
                out.line("planner is empty");
            }
            for day in &days {
                print_day(day, out);
            }
        }
        PlannerCommand::Move {
            from,
            id,
            to,
            index,
        } => {
            planner.move_item(from, &id, to, index.unwrap_or(usize::MAX))?;
            out.success(&format!("moved {id} to {to}"));
        }
        PlannerCommand::Sanitize => {
            if planner.sanitize()? {
                out.success("repaired planner items");
            } else {
                out.success("planner items already valid");
            }
        }
    }
    Ok(())
}

fn print_day(day: &PlannerDay, out: &Printer) {
    out.heading(&day.date.format("%a %Y-%m-%d").to_string());
    for item in &day.items {
        let times = match (&item.start_time, &item.end_time) {
            (Some(s), Some(e)) => format!("{s}-{e}"),
            (Some(s), None) => s.clone(),
            _ => "     ".to_string(),
        };
        out.row(&item.id, &format!("{} {times} {}", checkbox(item.completed), item.text));
    }
}
