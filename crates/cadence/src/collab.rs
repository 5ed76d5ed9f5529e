// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence collab` subcommands.

use cadence_core::CadenceError;
use cadence_features::{AppContext, CollabBrand, CollabTable};
use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::Value;

use crate::output::{money, Printer};

#[derive(Subcommand, Debug)]
pub enum CollabCommand {
    /// Add a brand row.
    Add { brand: String },
    /// Show the table.
    List,
    /// Set one cell. JSON values (numbers, booleans) are accepted as-is,
    /// anything else is stored as text.
    Set {
        id: String,
        /// Column key, e.g. `rate` or `depositPaid`.
        field: String,
        value: String,
    },
    /// Add a custom column.
    AddColumn { title: String },
    /// Delete a custom column and its values.
    DeleteColumn { key: String },
    /// Income totals across brands.
    Summary {
        /// Day used to decide what is overdue. Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

pub fn run(ctx: &AppContext, command: CollabCommand, out: &Printer) -> Result<(), CadenceError> {
    let table = CollabTable::mount(ctx);
    match command {
        CollabCommand::Add { brand } => {
            let id = table.handle_add_brand(&brand)?;
            out.success(&format!("added brand {id}"));
        }
        CollabCommand::List => {
            let columns = table.columns();
            let brands = table.brands();
            if brands.is_empty() {
                out.line("no brands");
            }
            for brand in &brands {
                out.heading(&format!("{} ({})", brand.brand_name, brand.id));
                let row = cells(brand)?;
                for column in columns.iter().filter(|c| c.key != "brandName") {
                    out.row(&format!("{:<20}", column.title), &cell_text(row.get(&column.key)));
                }
            }
        }
        CollabCommand::Set { id, field, value } => {
            table.handle_update_brand(&id, &field, parse_cell(&value))?;
            out.success(&format!("{id}.{field} updated"));
        }
        CollabCommand::AddColumn { title } => {
            let key = table.handle_add_column(&title)?;
            out.success(&format!("added column {key}"));
        }
        CollabCommand::DeleteColumn { key } => {
            table.handle_delete_column(&key)?;
            out.success(&format!("deleted column {key}"));
        }
        CollabCommand::Summary { today } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let summary = table.income_summary(today);
            out.row("total      ", &money(summary.total));
            out.row("paid       ", &money(summary.paid));
            out.row("outstanding", &money(summary.outstanding));
            out.row(
                "overdue    ",
                &format!("{} ({} brands)", money(summary.overdue_amount), summary.overdue),
            );
        }
    }
    Ok(())
}

fn cells(brand: &CollabBrand) -> Result<serde_json::Map<String, Value>, CadenceError> {
    match serde_json::to_value(brand) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CadenceError::Internal("brand did not encode as an object".into())),
        Err(e) => Err(CadenceError::Internal(format!("failed to encode brand: {e}"))),
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_cell(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}
