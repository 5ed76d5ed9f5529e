// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence tasks` subcommands.

use cadence_core::CadenceError;
use cadence_features::{AppContext, Priority, TaskList};
use chrono::NaiveDate;
use clap::Subcommand;

use crate::output::{checkbox, Printer};

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// Add a task.
    Add {
        text: String,
        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        due: Option<NaiveDate>,
        /// low, medium, or high.
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// List tasks. Open tasks only unless `--all` is given.
    List {
        #[arg(long)]
        all: bool,
    },
    /// Toggle a task's completion.
    Done { id: String },
}

pub fn run(ctx: &AppContext, command: TasksCommand, out: &Printer) -> Result<(), CadenceError> {
    let tasks = TaskList::mount(ctx);
    match command {
        TasksCommand::Add {
            text,
            due,
            priority,
        } => {
            let id = tasks.add(&text, due, priority)?;
            out.success(&format!("added task {id}"));
        }
        TasksCommand::List { all } => {
            let list = if all { tasks.tasks() } else { tasks.pending() };
            if list.is_empty() {
                out.line("no tasks");
            }
            for task in list {
                let due = task
                    .due_date
                    .map(|d| format!(" (due {d})"))
                    .unwrap_or_default();
                out.row(
                    &task.id,
                    &format!("{} [{}] {}{due}", checkbox(task.completed), task.priority, task.text),
                );
            }
        }
        TasksCommand::Done { id } => {
            let completed = tasks.toggle(&id)?;
            let state = if completed { "done" } else { "open" };
            out.success(&format!("{id} marked {state}"));
        }
    }
    Ok(())
}
