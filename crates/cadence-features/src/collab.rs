// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brand collaborations: a spreadsheet-like table whose columns the user
//! can add, rename, and delete.
//!
//! The column schema is stored next to the rows so user-defined columns
//! survive reloads. Values of user-defined columns live in each brand's
//! `extra` map; built-in columns map onto typed fields.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use cadence_core::{CadenceError, StorageKey};
use cadence_storage::{Document, MigrationTable};

use crate::context::{new_id, AppContext};
use crate::hook::PersistedState;

/// Columns that can never be deleted.
pub const PROTECTED_COLUMNS: &[&str] = &["brandName", "status"];

/// Brand fields that are not table columns and may not be used as column keys.
const RESERVED_KEYS: &[&str] = &["id"];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BrandStatus {
    #[default]
    Inbound,
    Pitched,
    Negotiating,
    Signed,
    InProgress,
    Completed,
    Declined,
}

/// One brand partnership row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollabBrand {
    pub id: String,
    pub brand_name: String,
    pub contact: String,
    pub product: String,
    pub status: BrandStatus,
    pub deliverables: String,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_payment_due_date: Option<NaiveDate>,
    pub deposit_paid: bool,
    pub invoice_sent: bool,
    pub payment_received: bool,
    pub notes: String,
    /// Values of user-defined columns, keyed by column key.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Schema entry describing one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub title: String,
    #[serde(default = "yes")]
    pub editable: bool,
    #[serde(default = "yes")]
    pub deletable: bool,
}

fn yes() -> bool {
    true
}

impl TableColumn {
    fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            editable: true,
            deletable: !PROTECTED_COLUMNS.contains(&key),
        }
    }
}

/// Built-in columns, in display order.
pub fn default_columns() -> Vec<TableColumn> {
    [
        ("brandName", "Brand"),
        ("contact", "Contact"),
        ("product", "Product"),
        ("status", "Status"),
        ("deliverables", "Deliverables"),
        ("rate", "Rate"),
        ("depositPaid", "Deposit Paid"),
        ("startDate", "Start Date"),
        ("endDate", "End Date"),
        ("finalPaymentDueDate", "Final Payment Due"),
        ("invoiceSent", "Invoice Sent"),
        ("paymentReceived", "Payment Received"),
        ("notes", "Notes"),
    ]
    .into_iter()
    .map(|(key, title)| TableColumn::new(key, title))
    .collect()
}

/// The table's column schema. Stored as a bare list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    pub columns: Vec<TableColumn>,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

impl TableSchema {
    pub fn column(&self, key: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}

impl Document for TableSchema {
    /// Version 2 added the `invoiceSent` column.
    const VERSION: u32 = 2;

    fn migrations() -> MigrationTable {
        MigrationTable::new().register(1, 2, add_invoice_sent_column)
    }
}

/// Inserts `invoiceSent` right after `finalPaymentDueDate`, or at the end if
/// that column is gone. A schema that already has it is returned unchanged.
fn add_invoice_sent_column(value: Value) -> Result<Value, String> {
    let Value::Array(mut columns) = value else {
        return Err("column schema is not a list".into());
    };
    let has_key = |col: &Value, key: &str| col.get("key").and_then(Value::as_str) == Some(key);

    if columns.iter().any(|c| has_key(c, "invoiceSent")) {
        return Ok(Value::Array(columns));
    }
    let column = json!({
        "key": "invoiceSent",
        "title": "Invoice Sent",
        "editable": true,
        "deletable": true,
    });
    match columns.iter().position(|c| has_key(c, "finalPaymentDueDate")) {
        Some(anchor) => columns.insert(anchor + 1, column),
        None => columns.push(column),
    }
    Ok(Value::Array(columns))
}

/// Derives a camelCase key from a column title.
pub fn column_key(title: &str) -> String {
    let mut key = String::new();
    for word in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if key.is_empty() {
            key.push(first.to_ascii_lowercase());
            key.extend(chars.map(|c| c.to_ascii_lowercase()));
        } else {
            key.push(first.to_ascii_uppercase());
            key.extend(chars.map(|c| c.to_ascii_lowercase()));
        }
    }
    key
}

/// Totals over the table's rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeSummary {
    /// Sum of rates for every non-declined brand.
    pub total: f64,
    pub paid: f64,
    pub outstanding: f64,
    /// Unpaid brands whose final payment date has passed.
    pub overdue: usize,
    pub overdue_amount: f64,
}

pub fn income_summary(brands: &[CollabBrand], today: NaiveDate) -> IncomeSummary {
    let mut summary = IncomeSummary::default();
    for brand in brands.iter().filter(|b| b.status != BrandStatus::Declined) {
        summary.total += brand.rate;
        if brand.payment_received {
            summary.paid += brand.rate;
            continue;
        }
        summary.outstanding += brand.rate;
        if brand.final_payment_due_date.is_some_and(|due| due < today) {
            summary.overdue += 1;
            summary.overdue_amount += brand.rate;
        }
    }
    summary
}

fn brand_not_found(id: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "brand",
        id: id.to_string(),
    }
}

fn column_not_found(key: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "column",
        id: key.to_string(),
    }
}

fn to_object(brand: &CollabBrand) -> Result<Map<String, Value>, CadenceError> {
    match serde_json::to_value(brand) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CadenceError::Internal("brand did not serialize to an object".into())),
        Err(source) => Err(CadenceError::Serialization {
            key: StorageKey::CollabBrands.name().into_owned(),
            source,
        }),
    }
}

/// The mounted collab table: brand rows plus their column schema.
pub struct CollabTable {
    brands: PersistedState<Vec<CollabBrand>>,
    columns: PersistedState<TableSchema>,
}

impl CollabTable {
    pub fn mount(ctx: &AppContext) -> Self {
        Self {
            brands: PersistedState::hydrate(ctx, StorageKey::CollabBrands),
            columns: PersistedState::hydrate(ctx, StorageKey::CollabColumns),
        }
    }

    pub fn brands(&self) -> Vec<CollabBrand> {
        self.brands.snapshot()
    }

    pub fn brand(&self, id: &str) -> Option<CollabBrand> {
        self.brands.read(|brands| brands.iter().find(|b| b.id == id).cloned())
    }

    pub fn columns(&self) -> Vec<TableColumn> {
        self.columns.read(|schema| schema.columns.clone())
    }

    pub fn brands_state(&self) -> &PersistedState<Vec<CollabBrand>> {
        &self.brands
    }

    pub fn columns_state(&self) -> &PersistedState<TableSchema> {
        &self.columns
    }

    pub fn save_brands(&self, brands: Vec<CollabBrand>) -> Result<(), CadenceError> {
        self.brands.save(brands)
    }

    pub fn save_table_columns(&self, columns: Vec<TableColumn>) -> Result<(), CadenceError> {
        self.columns.save(TableSchema { columns })
    }

    /// Adds a brand row. User-defined columns start out empty. Returns its id.
    pub fn handle_add_brand(&self, brand_name: &str) -> Result<String, CadenceError> {
        let brand_name = brand_name.trim();
        if brand_name.is_empty() {
            return Err(CadenceError::Validation("brand name must not be empty".into()));
        }
        let builtin = default_columns();
        let extra = self.columns.read(|schema| {
            schema
                .keys()
                .filter(|k| !builtin.iter().any(|b| b.key == *k))
                .map(|k| (k.to_string(), Value::String(String::new())))
                .collect()
        });
        let brand = CollabBrand {
            id: new_id(),
            brand_name: brand_name.to_string(),
            extra,
            ..Default::default()
        };
        let id = brand.id.clone();
        self.brands.modify(|brands| {
            brands.push(brand);
            Ok(())
        })?;
        debug!(%id, "brand added");
        Ok(id)
    }

    /// Sets one cell. `field` must be an editable column of the table, and
    /// `value` must fit that column's type.
    pub fn handle_update_brand(
        &self,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), CadenceError> {
        let column = self
            .columns
            .read(|schema| schema.column(field).cloned())
            .ok_or_else(|| column_not_found(field))?;
        if !column.editable {
            return Err(CadenceError::Validation(format!(
                "column '{}' is read-only",
                column.title
            )));
        }

        self.brands.modify(|brands| {
            let brand = brands
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| brand_not_found(id))?;
            let mut row = to_object(brand)?;
            row.insert(field.to_string(), value);
            let updated: CollabBrand = serde_json::from_value(Value::Object(row)).map_err(|e| {
                CadenceError::Validation(format!("invalid value for '{}': {e}", column.title))
            })?;
            *brand = updated;
            Ok(())
        })
    }

    pub fn handle_delete_brand(&self, id: &str) -> Result<(), CadenceError> {
        self.brands.modify(|brands| {
            let before = brands.len();
            brands.retain(|b| b.id != id);
            if brands.len() == before {
                return Err(brand_not_found(id));
            }
            Ok(())
        })
    }

    /// Adds a user-defined column titled `title`. Returns its key.
    pub fn handle_add_column(&self, title: &str) -> Result<String, CadenceError> {
        let title = title.trim();
        let base = column_key(title);
        if base.is_empty() {
            return Err(CadenceError::Validation(
                "column title needs at least one letter or digit".into(),
            ));
        }

        let key = self.columns.modify(|schema| {
            let taken = |k: &str| {
                schema.column(k).is_some()
                    || RESERVED_KEYS.contains(&k)
                    || default_columns().iter().any(|c| c.key == k)
            };
            let mut key = base.clone();
            let mut n = 2;
            while taken(&key) {
                key = format!("{base}{n}");
                n += 1;
            }
            schema.columns.push(TableColumn::new(&key, title));
            Ok(key)
        })?;
        info!(%key, "collab column added");
        Ok(key)
    }

    /// Changes a column's title. Its key, and so its data, stay put.
    pub fn handle_rename_column(&self, key: &str, title: &str) -> Result<(), CadenceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CadenceError::Validation("column title must not be empty".into()));
        }
        self.columns.modify(|schema| {
            let column = schema
                .columns
                .iter_mut()
                .find(|c| c.key == key)
                .ok_or_else(|| column_not_found(key))?;
            column.title = title.to_string();
            Ok(())
        })
    }

    /// Removes a column and its value from every brand.
    ///
    /// Protected columns are rejected and the schema is left unchanged.
    /// Built-in fields of a deleted column fall back to their defaults.
    pub fn handle_delete_column(&self, key: &str) -> Result<(), CadenceError> {
        let column = self
            .columns
            .read(|schema| schema.column(key).cloned())
            .ok_or_else(|| column_not_found(key))?;
        if PROTECTED_COLUMNS.contains(&key) || !column.deletable {
            return Err(CadenceError::ProtectedColumn(key.to_string()));
        }

        let mut brands = self.brands.snapshot();
        let mut touched = 0usize;
        for brand in &mut brands {
            let mut row = to_object(brand)?;
            if row.remove(key).is_some() {
                *brand = serde_json::from_value(Value::Object(row)).map_err(|source| {
                    CadenceError::Serialization {
                        key: StorageKey::CollabBrands.name().into_owned(),
                        source,
                    }
                })?;
                touched += 1;
            }
        }

        self.columns.modify(|schema| {
            schema.columns.retain(|c| c.key != key);
            Ok(())
        })?;
        if touched > 0 {
            self.brands.save(brands)?;
        }
        info!(%key, touched, "collab column deleted");
        Ok(())
    }

    pub fn income_summary(&self, today: NaiveDate) -> IncomeSummary {
        self.brands.read(|brands| income_summary(brands, today))
    }
}
