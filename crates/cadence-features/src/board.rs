// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Production board: cards moving through kanban columns, and the derived
//! "completed steps" of the production wizard.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info};

use cadence_core::{CadenceError, StorageKey};
use cadence_storage::Document;

use crate::content::{ContentStatus, ScheduledContentItem};
use crate::context::{new_id, AppContext};
use crate::hook::PersistedState;

/// Kanban columns, in board order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ColumnId {
    Ideate,
    ScriptIdeas,
    ToFilm,
    ToEdit,
    ToSchedule,
    Published,
}

impl ColumnId {
    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Ideate => "Ideate",
            ColumnId::ScriptIdeas => "Script Ideas",
            ColumnId::ToFilm => "To Film",
            ColumnId::ToEdit => "To Edit",
            ColumnId::ToSchedule => "To Schedule",
            ColumnId::Published => "Published",
        }
    }

    /// Zero-based position on the board.
    pub fn position(self) -> usize {
        self as usize
    }
}

/// Steps of the production wizard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ProductionStep {
    Ideate = 1,
    Script = 2,
    Storyboard = 3,
    Edit = 4,
    Schedule = 5,
}

impl ProductionStep {
    pub fn number(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardFrame {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionCard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub storyboard: Vec<StoryboardFrame>,
    #[serde(default)]
    pub edit_checklist: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
}

impl ProductionCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// The calendar entry for this card when it sits in `column`.
    pub fn to_content_item(&self, column: ColumnId) -> ScheduledContentItem {
        let status = match (column, self.scheduled_date) {
            (ColumnId::Published, _) => ContentStatus::Published,
            (_, Some(_)) => ContentStatus::Scheduled,
            (ColumnId::ToSchedule, None) => ContentStatus::Ready,
            _ => ContentStatus::Draft,
        };
        ScheduledContentItem {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            platforms: self.platforms.clone(),
            format: self.format.clone(),
            status,
            scheduled_date: self.scheduled_date,
        }
    }
}

/// Steps whose field is filled in, plus every step the card's column implies.
pub fn completed_steps(card: &ProductionCard, column: ColumnId) -> BTreeSet<ProductionStep> {
    let implied = column.position();
    ProductionStep::iter()
        .filter(|step| {
            let filled = match step {
                ProductionStep::Ideate => !card.title.trim().is_empty(),
                ProductionStep::Script => !card.script.trim().is_empty(),
                ProductionStep::Storyboard => !card.storyboard.is_empty(),
                ProductionStep::Edit => !card.edit_checklist.is_empty(),
                ProductionStep::Schedule => card.scheduled_date.is_some(),
            };
            filled || usize::from(step.number()) <= implied
        })
        .collect()
}

/// The wizard step to open first: the lowest one not yet complete.
pub fn first_open_step(card: &ProductionCard, column: ColumnId) -> Option<ProductionStep> {
    let done = completed_steps(card, column);
    ProductionStep::iter().find(|s| !done.contains(s))
}

/// Completion as a percentage, in steps of 20.
pub fn progress(card: &ProductionCard, column: ColumnId) -> u8 {
    let done = completed_steps(card, column).len();
    (done * 100 / ProductionStep::iter().count()) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanbanColumn {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<ProductionCard>,
}

impl KanbanColumn {
    pub fn empty(id: ColumnId) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            cards: Vec::new(),
        }
    }
}

/// All board columns. Stored as a bare list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionBoard {
    pub columns: Vec<KanbanColumn>,
}

impl Default for ProductionBoard {
    fn default() -> Self {
        Self {
            columns: ColumnId::iter().map(KanbanColumn::empty).collect(),
        }
    }
}

impl Document for ProductionBoard {}

impl ProductionBoard {
    pub fn column(&self, id: ColumnId) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    fn column_mut(&mut self, id: ColumnId) -> Result<&mut KanbanColumn, CadenceError> {
        self.columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CadenceError::NotFound {
                kind: "column",
                id: id.to_string(),
            })
    }

    pub fn find_card(&self, id: &str) -> Option<(ColumnId, &ProductionCard)> {
        self.columns
            .iter()
            .find_map(|col| col.cards.iter().find(|c| c.id == id).map(|c| (col.id, c)))
    }

    fn take_card(&mut self, id: &str) -> Result<(ColumnId, ProductionCard), CadenceError> {
        for col in &mut self.columns {
            if let Some(pos) = col.cards.iter().position(|c| c.id == id) {
                return Ok((col.id, col.cards.remove(pos)));
            }
        }
        Err(card_not_found(id))
    }
}

/// Adds missing columns, merges duplicates, and restores board order.
///
/// Returns whether anything changed.
pub fn ensure_columns(board: &mut ProductionBoard) -> bool {
    let layout = |cols: &[KanbanColumn]| -> Vec<(ColumnId, usize)> {
        cols.iter().map(|c| (c.id, c.cards.len())).collect()
    };
    let before = layout(&board.columns);

    let mut repaired: Vec<KanbanColumn> = Vec::with_capacity(before.len());
    for col in board.columns.drain(..) {
        match repaired.iter_mut().find(|c| c.id == col.id) {
            Some(existing) => existing.cards.extend(col.cards),
            None => repaired.push(col),
        }
    }
    for id in ColumnId::iter() {
        if !repaired.iter().any(|c| c.id == id) {
            repaired.push(KanbanColumn::empty(id));
        }
    }
    repaired.sort_by_key(|c| c.id);

    let changed = layout(&repaired) != before;
    board.columns = repaired;
    changed
}

fn card_not_found(id: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "card",
        id: id.to_string(),
    }
}

/// The mounted production board.
pub struct Board {
    state: PersistedState<ProductionBoard>,
}

impl Board {
    pub fn mount(ctx: &AppContext) -> Self {
        Self {
            state: PersistedState::hydrate_with(ctx, StorageKey::ProductionBoard, ensure_columns),
        }
    }

    pub fn state(&self) -> &PersistedState<ProductionBoard> {
        &self.state
    }

    pub fn board(&self) -> ProductionBoard {
        self.state.snapshot()
    }

    /// Replaces every column.
    pub fn save_columns(&self, mut board: ProductionBoard) -> Result<(), CadenceError> {
        ensure_columns(&mut board);
        self.state.save(board)
    }

    /// Adds `card` at the bottom of `column`. Returns its id.
    pub fn add_card(&self, column: ColumnId, mut card: ProductionCard) -> Result<String, CadenceError> {
        if card.title.trim().is_empty() {
            return Err(CadenceError::Validation("card title must not be empty".into()));
        }
        if card.id.is_empty() {
            card.id = new_id();
        }
        let id = card.id.clone();
        self.state.modify(|board| {
            if board.find_card(&id).is_some() {
                return Err(CadenceError::Validation(format!("duplicate card id '{id}'")));
            }
            board.column_mut(column)?.cards.push(card);
            Ok(())
        })?;
        debug!(%id, %column, "card added");
        Ok(id)
    }

    /// Moves a card to position `index` (clamped) of column `to`.
    pub fn move_card(&self, id: &str, to: ColumnId, index: usize) -> Result<(), CadenceError> {
        let from = self.state.modify(|board| {
            let (from, card) = board.take_card(id)?;
            let target = board.column_mut(to)?;
            let index = index.min(target.cards.len());
            target.cards.insert(index, card);
            Ok(from)
        })?;
        info!(card = id, %from, %to, index, "card moved");
        Ok(())
    }

    /// Applies `edit` to one card in place.
    pub fn update_card(
        &self,
        id: &str,
        edit: impl FnOnce(&mut ProductionCard),
    ) -> Result<(), CadenceError> {
        self.state.modify(|board| {
            let card = board
                .columns
                .iter_mut()
                .find_map(|col| col.cards.iter_mut().find(|c| c.id == id))
                .ok_or_else(|| card_not_found(id))?;
            edit(card);
            card.id = id.to_string();
            Ok(())
        })
    }

    pub fn delete_card(&self, id: &str) -> Result<(), CadenceError> {
        self.state.modify(|board| board.take_card(id).map(|_| ()))
    }

    pub fn find_card(&self, id: &str) -> Option<(ColumnId, ProductionCard)> {
        self.state
            .read(|board| board.find_card(id).map(|(col, card)| (col, card.clone())))
    }
}
