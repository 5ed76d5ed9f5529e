// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence board` subcommands.

use cadence_core::CadenceError;
use cadence_features::{progress, AppContext, Board, ColumnId, ProductionCard};
use clap::Subcommand;

use crate::output::Printer;

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Show every column with its cards and their progress.
    Show,
    /// Add a card.
    Add {
        title: String,
        /// ideate, script-ideas, to-film, to-edit, to-schedule, or published.
        #[arg(long, default_value = "ideate")]
        column: ColumnId,
        #[arg(long = "platform")]
        platforms: Vec<String>,
    },
    /// Move a card to a column.
    Move {
        id: String,
        column: ColumnId,
        /// Position in the column. Defaults to the end.
        #[arg(long)]
        index: Option<usize>,
    },
}

pub fn run(ctx: &AppContext, command: BoardCommand, out: &Printer) -> Result<(), CadenceError> {
    let board = Board::mount(ctx);
    match command {
        BoardCommand::Show => {
            for column in board.board().columns {
                out.heading(&format!("{} ({})", column.title, column.cards.len()));
                for card in &column.cards {
                    out.row(
                        &card.id,
                        &format!("{:>3}% {}", progress(card, column.id), card.title),
                    );
                }
            }
        }
        BoardCommand::Add {
            title,
            column,
            platforms,
        } => {
            let card = ProductionCard {
                platforms,
                ..ProductionCard::new(title)
            };
            let id = board.add_card(column, card)?;
            out.success(&format!("added {column} card {id}"));
        }
        BoardCommand::Move { id, column, index } => {
            board.move_card(&id, column, index.unwrap_or(usize::MAX))?;
            out.success(&format!("moved {id} to {column}"));
        }
    }
    Ok(())
}
