// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the storage, bus, and feature crates.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Identifier of the signed-in user owning per-user flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prefix of the per-user onboarding key.
const ONBOARDING_PREFIX: &str = "onboardingCompleted:";

/// Closed set of keys a document may be stored under.
///
/// Every persisted document lives under exactly one of these keys, so a typo
/// in a key name is a compile error instead of silently lost data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Daily planner days with their items.
    PlannerData,
    /// The flat all-tasks list.
    AllTasks,
    /// Content ideas on the content calendar.
    ScheduledContent,
    /// Kanban columns of the production board.
    ProductionBoard,
    /// Brand partnership rows of the collab table.
    CollabBrands,
    /// Column schema of the collab table.
    CollabColumns,
    /// Planner-wide settings (weekly goals, focus).
    GlobalPlannerData,
    /// Vision board record.
    VisionBoard,
    /// Google Calendar tokens and connection flags.
    GoogleCalendar,
    /// Sidebar menu configuration.
    SidebarMenu,
    /// Onboarding completion flag for one user.
    OnboardingCompleted(UserId),
}

impl StorageKey {
    /// Name of the key inside its namespace.
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            StorageKey::PlannerData => Cow::Borrowed("plannerData"),
            StorageKey::AllTasks => Cow::Borrowed("allTasks"),
            StorageKey::ScheduledContent => Cow::Borrowed("scheduledContent"),
            StorageKey::ProductionBoard => Cow::Borrowed("productionKanban"),
            StorageKey::CollabBrands => Cow::Borrowed("collabBrands"),
            StorageKey::CollabColumns => Cow::Borrowed("collabColumns"),
            StorageKey::GlobalPlannerData => Cow::Borrowed("globalPlannerData"),
            StorageKey::VisionBoard => Cow::Borrowed("visionBoardData"),
            StorageKey::GoogleCalendar => Cow::Borrowed("googleCalendarConnection"),
            StorageKey::SidebarMenu => Cow::Borrowed("sidebarMenu"),
            StorageKey::OnboardingCompleted(user) => {
                Cow::Owned(format!("{ONBOARDING_PREFIX}{}", user.0))
            }
        }
    }

    /// Every key that does not belong to a particular user.
    pub fn fixed() -> [StorageKey; 10] {
        [
            StorageKey::PlannerData,
            StorageKey::AllTasks,
            StorageKey::ScheduledContent,
            StorageKey::ProductionBoard,
            StorageKey::CollabBrands,
            StorageKey::CollabColumns,
            StorageKey::GlobalPlannerData,
            StorageKey::VisionBoard,
            StorageKey::GoogleCalendar,
            StorageKey::SidebarMenu,
        ]
    }

    /// Parse a key name back into a key. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "plannerData" => StorageKey::PlannerData,
            "allTasks" => StorageKey::AllTasks,
            "scheduledContent" => StorageKey::ScheduledContent,
            "productionKanban" => StorageKey::ProductionBoard,
            "collabBrands" => StorageKey::CollabBrands,
            "collabColumns" => StorageKey::CollabColumns,
            "globalPlannerData" => StorageKey::GlobalPlannerData,
            "visionBoardData" => StorageKey::VisionBoard,
            "googleCalendarConnection" => StorageKey::GoogleCalendar,
            "sidebarMenu" => StorageKey::SidebarMenu,
            other => {
                let user = other.strip_prefix(ONBOARDING_PREFIX)?;
                if user.is_empty() {
                    return None;
                }
                StorageKey::OnboardingCompleted(UserId(user.to_string()))
            }
        };
        Some(key)
    }

    /// The bus topic announcing changes to this key.
    pub fn topic(&self) -> Topic {
        match self {
            StorageKey::PlannerData => Topic::PlannerData,
            StorageKey::AllTasks => Topic::AllTasks,
            StorageKey::ScheduledContent => Topic::ScheduledContent,
            StorageKey::ProductionBoard => Topic::ProductionBoard,
            StorageKey::CollabBrands => Topic::CollabBrands,
            StorageKey::CollabColumns => Topic::CollabColumns,
            StorageKey::GlobalPlannerData => Topic::GlobalPlanner,
            StorageKey::VisionBoard => Topic::VisionBoard,
            StorageKey::GoogleCalendar => Topic::GoogleCalendar,
            StorageKey::SidebarMenu => Topic::SidebarMenu,
            StorageKey::OnboardingCompleted(_) => Topic::Onboarding,
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Topics published on the event bus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Topic {
    PlannerData,
    AllTasks,
    ScheduledContent,
    ProductionBoard,
    CollabBrands,
    CollabColumns,
    GlobalPlanner,
    VisionBoard,
    GoogleCalendar,
    SidebarMenu,
    Onboarding,
}

/// One entry of a backend change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Monotonic sequence number assigned by the backend.
    pub seq: i64,
    /// Full (namespaced) key that changed.
    pub key: String,
    /// Origin id of the handle that made the change.
    pub origin: String,
    /// Value stored under the key when the log was read; `None` if removed.
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn all_keys() -> Vec<StorageKey> {
        vec![
            StorageKey::PlannerData,
            StorageKey::AllTasks,
            StorageKey::ScheduledContent,
            StorageKey::ProductionBoard,
            StorageKey::CollabBrands,
            StorageKey::CollabColumns,
            StorageKey::GlobalPlannerData,
            StorageKey::VisionBoard,
            StorageKey::GoogleCalendar,
            StorageKey::SidebarMenu,
            StorageKey::OnboardingCompleted(UserId("user_42".into())),
        ]
    }

    #[test]
    fn key_names_parse_back() {
        for key in all_keys() {
            let name = key.name();
            assert_eq!(StorageKey::from_name(&name), Some(key.clone()), "{name}");
        }
    }

    #[test]
    fn key_names_are_unique() {
        let mut names: Vec<_> = all_keys().iter().map(|k| k.name().into_owned()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all_keys().len());
    }

    #[test]
    fn unknown_key_names_are_rejected() {
        assert_eq!(StorageKey::from_name("plannerdata"), None);
        assert_eq!(StorageKey::from_name("onboardingCompleted:"), None);
        assert_eq!(StorageKey::from_name(""), None);
    }

    #[test]
    fn onboarding_key_embeds_user_id() {
        let key = StorageKey::OnboardingCompleted(UserId("u-7".into()));
        assert_eq!(key.name(), "onboardingCompleted:u-7");
        assert_eq!(key.topic(), Topic::Onboarding);
    }

    #[test]
    fn every_topic_has_a_key() {
        let covered: Vec<Topic> = all_keys().iter().map(StorageKey::topic).collect();
        for topic in Topic::iter() {
            assert!(covered.contains(&topic), "no key maps to {topic}");
        }
    }

    #[test]
    fn topic_display_and_parse() {
        assert_eq!(Topic::PlannerData.to_string(), "planner-data");
        assert_eq!(Topic::from_str("collab-columns").unwrap(), Topic::CollabColumns);
    }
}
