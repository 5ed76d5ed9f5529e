// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature data for Cadence.
//!
//! Every feature is a mounted [`PersistedState`] over one stored document:
//! the daily planner, the all-tasks list, the content calendar, the
//! production board, the brand collab table, and a handful of singleton
//! settings. Handles mounted from the same [`AppContext`] stay in sync
//! through its local channel; handles in other contexts catch up through a
//! storage watcher.

pub mod board;
pub mod collab;
pub mod content;
pub mod context;
pub mod hook;
pub mod planner;
pub mod settings;
pub mod tasks;

pub use board::{
    completed_steps, first_open_step, progress, Board, ColumnId, KanbanColumn, ProductionBoard,
    ProductionCard, ProductionStep,
};
pub use collab::{
    income_summary, BrandStatus, CollabBrand, CollabTable, IncomeSummary, TableColumn,
    TableSchema, PROTECTED_COLUMNS,
};
pub use content::{ContentCalendar, ContentStatus, ScheduledContentItem};
pub use context::{new_id, AppContext};
pub use hook::PersistedState;
pub use planner::{sanitize_days, Planner, PlannerDay, PlannerItem};
pub use settings::Setting;
pub use tasks::{Priority, Task, TaskList};
