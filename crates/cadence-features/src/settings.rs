// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Singleton records replaced wholesale on every write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use cadence_core::{CadenceError, StorageKey, UserId};
use cadence_storage::{Document, MigrationTable};

use crate::context::AppContext;
use crate::hook::PersistedState;

/// Planner-wide goals and notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalPlannerData {
    pub weekly_goals: Vec<String>,
    pub monthly_focus: String,
    pub notes: String,
}

impl Document for GlobalPlannerData {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionBoardData {
    pub title: String,
    pub goals: Vec<String>,
    pub image_urls: Vec<String>,
    pub affirmation: String,
}

impl Document for VisionBoardData {}

/// Google Calendar tokens and connection flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleCalendarConnection {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub calendar_ids: Vec<String>,
}

impl Document for GoogleCalendarConnection {}

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

impl GoogleCalendarConnection {
    /// Whether the access token is missing or (nearly) expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(at)) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(default = "visible")]
    pub visible: bool,
}

fn visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarMenu {
    pub items: Vec<MenuItem>,
    pub collapsed: bool,
}

impl Default for SidebarMenu {
    fn default() -> Self {
        let items = [
            ("dashboard", "Dashboard"),
            ("planner", "Planner"),
            ("content-calendar", "Content Calendar"),
            ("production", "Production"),
            ("collab", "Brand Collabs"),
            ("income", "Income"),
            ("vision-board", "Vision Board"),
            ("settings", "Settings"),
        ]
        .into_iter()
        .map(|(id, label)| MenuItem {
            id: id.to_string(),
            label: label.to_string(),
            visible: true,
        })
        .collect();
        Self {
            items,
            collapsed: false,
        }
    }
}

impl Document for SidebarMenu {}

/// Whether a user finished onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingState {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Document for OnboardingState {
    /// Version 1 stored a bare boolean.
    const VERSION: u32 = 2;

    fn migrations() -> MigrationTable {
        MigrationTable::new().register(1, 2, |value| match value {
            Value::Bool(completed) => Ok(json!({ "completed": completed })),
            Value::String(s) => Ok(json!({ "completed": s == "true" })),
            Value::Null => Ok(json!({})),
            other => Err(format!("unexpected onboarding flag {other}")),
        })
    }
}

/// A mounted singleton record.
pub struct Setting<D: Document> {
    state: PersistedState<D>,
}

impl<D: Document> Setting<D> {
    pub fn mount(ctx: &AppContext, key: StorageKey) -> Self {
        Self {
            state: PersistedState::hydrate(ctx, key),
        }
    }

    pub fn get(&self) -> D {
        self.state.snapshot()
    }

    pub fn save(&self, value: D) -> Result<(), CadenceError> {
        self.state.save(value)
    }

    pub fn update(&self, edit: impl FnOnce(&mut D)) -> Result<(), CadenceError> {
        self.state.modify(|value| {
            edit(value);
            Ok(())
        })
    }

    /// Forgets the stored record.
    pub fn reset(&self) -> Result<(), CadenceError> {
        self.state.clear()
    }

    pub fn state(&self) -> &PersistedState<D> {
        &self.state
    }
}

pub fn global_planner(ctx: &AppContext) -> Setting<GlobalPlannerData> {
    Setting::mount(ctx, StorageKey::GlobalPlannerData)
}

pub fn vision_board(ctx: &AppContext) -> Setting<VisionBoardData> {
    Setting::mount(ctx, StorageKey::VisionBoard)
}

pub fn google_calendar(ctx: &AppContext) -> Setting<GoogleCalendarConnection> {
    Setting::mount(ctx, StorageKey::GoogleCalendar)
}

pub fn sidebar_menu(ctx: &AppContext) -> Setting<SidebarMenu> {
    Setting::mount(ctx, StorageKey::SidebarMenu)
}

pub fn onboarding(ctx: &AppContext, user: UserId) -> Setting<OnboardingState> {
    Setting::mount(ctx, StorageKey::OnboardingCompleted(user))
}

impl Setting<OnboardingState> {
    pub fn is_completed(&self) -> bool {
        self.state.read(|s| s.completed)
    }

    pub fn complete(&self, at: DateTime<Utc>) -> Result<(), CadenceError> {
        self.save(OnboardingState {
            completed: true,
            completed_at: Some(at),
        })
    }
}

impl Setting<GoogleCalendarConnection> {
    /// Drops tokens and marks the calendar disconnected.
    pub fn disconnect(&self) -> Result<(), CadenceError> {
        self.save(GoogleCalendarConnection::default())
    }
}
