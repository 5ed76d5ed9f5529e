// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The flat all-tasks list shown beside the planner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use cadence_core::{CadenceError, StorageKey};

use crate::context::{new_id, AppContext};
use crate::hook::PersistedState;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
}

fn task_not_found(id: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "task",
        id: id.to_string(),
    }
}

/// The mounted all-tasks list.
pub struct TaskList {
    state: PersistedState<Vec<Task>>,
}

impl TaskList {
    pub fn mount(ctx: &AppContext) -> Self {
        Self {
            state: PersistedState::hydrate(ctx, StorageKey::AllTasks),
        }
    }

    pub fn state(&self) -> &PersistedState<Vec<Task>> {
        &self.state
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.snapshot()
    }

    /// Replaces the whole list.
    pub fn save_all_tasks(&self, tasks: Vec<Task>) -> Result<(), CadenceError> {
        self.state.save(tasks)
    }

    /// Adds a task. Returns its id.
    pub fn add(
        &self,
        text: &str,
        due_date: Option<NaiveDate>,
        priority: Priority,
    ) -> Result<String, CadenceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CadenceError::Validation("task text must not be empty".into()));
        }
        let task = Task {
            id: new_id(),
            text: text.to_string(),
            completed: false,
            due_date,
            priority,
        };
        let id = task.id.clone();
        self.state.modify(|tasks| {
            tasks.push(task);
            Ok(())
        })?;
        debug!(%id, "task added");
        Ok(id)
    }

    /// Flips completion. Returns the new state.
    pub fn toggle(&self, id: &str) -> Result<bool, CadenceError> {
        self.state.modify(|tasks| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| task_not_found(id))?;
            task.completed = !task.completed;
            Ok(task.completed)
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), CadenceError> {
        self.state.modify(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before {
                return Err(task_not_found(id));
            }
            Ok(())
        })
    }

    /// Removes completed tasks. Returns how many were removed.
    pub fn clear_completed(&self) -> Result<usize, CadenceError> {
        let removed = self.state.read(|tasks| tasks.iter().filter(|t| t.completed).count());
        if removed == 0 {
            return Ok(0);
        }
        self.state.modify(|tasks| {
            tasks.retain(|t| !t.completed);
            Ok(removed)
        })
    }

    /// Open tasks: dated ones first by due date, then by priority, high first.
    pub fn pending(&self) -> Vec<Task> {
        let mut open: Vec<Task> = self
            .state
            .read(|tasks| tasks.iter().filter(|t| !t.completed).cloned().collect());
        open.sort_by(|a, b| {
            let due = match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            due.then_with(|| b.priority.cmp(&a.priority))
        });
        open
    }
}
