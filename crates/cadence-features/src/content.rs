// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content calendar: content ideas with an optional publishing date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use cadence_core::{CadenceError, StorageKey};

use crate::context::{new_id, AppContext};
use crate::hook::PersistedState;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentStatus {
    #[default]
    Draft,
    Ready,
    Scheduled,
    Published,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledContentItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
}

impl ScheduledContentItem {
    /// A draft idea with a fresh id.
    pub fn draft(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn is_on(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p.eq_ignore_ascii_case(platform))
    }
}

fn content_not_found(id: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "content item",
        id: id.to_string(),
    }
}

fn check(item: &ScheduledContentItem) -> Result<(), CadenceError> {
    if item.title.trim().is_empty() {
        return Err(CadenceError::Validation("content title must not be empty".into()));
    }
    if item.status == ContentStatus::Scheduled && item.scheduled_date.is_none() {
        return Err(CadenceError::Validation(
            "scheduled content needs a date".into(),
        ));
    }
    Ok(())
}

/// The mounted content calendar.
pub struct ContentCalendar {
    state: PersistedState<Vec<ScheduledContentItem>>,
}

impl ContentCalendar {
    pub fn mount(ctx: &AppContext) -> Self {
        Self {
            state: PersistedState::hydrate(ctx, StorageKey::ScheduledContent),
        }
    }

    pub fn state(&self) -> &PersistedState<Vec<ScheduledContentItem>> {
        &self.state
    }

    pub fn items(&self) -> Vec<ScheduledContentItem> {
        self.state.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<ScheduledContentItem> {
        self.state.read(|items| items.iter().find(|i| i.id == id).cloned())
    }

    /// Replaces the whole calendar.
    pub fn save_scheduled_content(
        &self,
        items: Vec<ScheduledContentItem>,
    ) -> Result<(), CadenceError> {
        self.state.save(items)
    }

    /// Adds `item`, minting an id if it has none. Returns the id.
    pub fn add(&self, mut item: ScheduledContentItem) -> Result<String, CadenceError> {
        check(&item)?;
        if item.id.is_empty() {
            item.id = new_id();
        }
        let id = item.id.clone();
        self.state.modify(|items| {
            if items.iter().any(|i| i.id == id) {
                return Err(CadenceError::Validation(format!("duplicate content id '{id}'")));
            }
            items.push(item);
            Ok(())
        })?;
        debug!(%id, "content added");
        Ok(id)
    }

    /// Inserts `item` or replaces the entry with the same id.
    pub fn upsert(&self, item: ScheduledContentItem) -> Result<(), CadenceError> {
        check(&item)?;
        self.state.modify(|items| {
            match items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
            Ok(())
        })
    }

    /// Applies `edit` to one item. The edited item must still be valid.
    pub fn update(
        &self,
        id: &str,
        edit: impl FnOnce(&mut ScheduledContentItem),
    ) -> Result<(), CadenceError> {
        self.state.modify(|items| {
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| content_not_found(id))?;
            edit(item);
            item.id = id.to_string();
            check(item)
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), CadenceError> {
        self.state.modify(|items| {
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Err(content_not_found(id));
            }
            Ok(())
        })
    }

    /// Puts an item on the calendar. Published items keep their status.
    pub fn schedule(&self, id: &str, date: NaiveDate) -> Result<(), CadenceError> {
        self.update(id, |item| {
            item.scheduled_date = Some(date);
            if item.status != ContentStatus::Published {
                item.status = ContentStatus::Scheduled;
            }
        })
    }

    /// Takes an item off the calendar; scheduled items fall back to ready.
    pub fn unschedule(&self, id: &str) -> Result<(), CadenceError> {
        self.update(id, |item| {
            item.scheduled_date = None;
            if item.status == ContentStatus::Scheduled {
                item.status = ContentStatus::Ready;
            }
        })
    }

    /// Sets the status. Moving to `scheduled` requires a date.
    pub fn set_status(&self, id: &str, status: ContentStatus) -> Result<(), CadenceError> {
        self.update(id, |item| item.status = status)
    }

    /// Items dated within `from..=to`, by date.
    pub fn in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<ScheduledContentItem> {
        let mut found: Vec<ScheduledContentItem> = self.state.read(|items| {
            items
                .iter()
                .filter(|i| i.scheduled_date.is_some_and(|d| d >= from && d <= to))
                .cloned()
                .collect()
        });
        found.sort_by_key(|i| i.scheduled_date);
        found
    }

    /// Items tagged with `platform`, compared case-insensitively.
    pub fn for_platform(&self, platform: &str) -> Vec<ScheduledContentItem> {
        self.state
            .read(|items| items.iter().filter(|i| i.is_on(platform)).cloned().collect())
    }

    /// Drafts and ready items with no date.
    pub fn unscheduled(&self) -> Vec<ScheduledContentItem> {
        self.state.read(|items| {
            items
                .iter()
                .filter(|i| i.scheduled_date.is_none() && i.status != ContentStatus::Published)
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn idea(title: &str, platforms: &[&str]) -> ScheduledContentItem {
        ScheduledContentItem {
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            format: "short".into(),
            ..ScheduledContentItem::draft(title)
        }
    }

    #[test]
    fn schedule_and_unschedule_move_status() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let id = cal.add(idea("Studio tour", &["YouTube"])).unwrap();

        cal.schedule(&id, date("2026-05-01")).unwrap();
        let item = cal.get(&id).unwrap();
        assert_eq!(item.status, ContentStatus::Scheduled);
        assert_eq!(item.scheduled_date, Some(date("2026-05-01")));

        cal.unschedule(&id).unwrap();
        let item = cal.get(&id).unwrap();
        assert_eq!(item.status, ContentStatus::Ready);
        assert_eq!(cal.unscheduled().len(), 1);
    }

    #[test]
    fn scheduled_status_requires_a_date() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let id = cal.add(idea("Q&A", &[])).unwrap();
        assert!(matches!(
            cal.set_status(&id, ContentStatus::Scheduled),
            Err(CadenceError::Validation(_))
        ));
        assert_eq!(cal.get(&id).unwrap().status, ContentStatus::Draft);

        cal.set_status(&id, ContentStatus::Published).unwrap();
        cal.schedule(&id, date("2026-05-02")).unwrap();
        assert_eq!(cal.get(&id).unwrap().status, ContentStatus::Published);
    }

    #[test]
    fn range_and_platform_queries() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let a = cal.add(idea("a", &["TikTok"])).unwrap();
        let b = cal.add(idea("b", &["tiktok", "Instagram"])).unwrap();
        let c = cal.add(idea("c", &["YouTube"])).unwrap();
        cal.schedule(&a, date("2026-05-10")).unwrap();
        cal.schedule(&b, date("2026-05-03")).unwrap();
        cal.schedule(&c, date("2026-06-01")).unwrap();

        let may: Vec<_> = cal
            .in_range(date("2026-05-01"), date("2026-05-31"))
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(may, vec!["b", "a"]);
        assert_eq!(cal.for_platform("TIKTOK").len(), 2);
    }

    #[test]
    fn delete_and_missing_ids() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let id = cal.add(idea("gone", &[])).unwrap();
        cal.delete(&id).unwrap();
        assert!(matches!(cal.delete(&id), Err(CadenceError::NotFound { .. })));
        assert!(matches!(
            cal.schedule(&id, date("2026-01-01")),
            Err(CadenceError::NotFound { .. })
        ));
    }

    #[test]
    fn upsert_replaces_by_id() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let mut item = idea("v1", &[]);
        cal.upsert(item.clone()).unwrap();
        item.title = "v2".into();
        cal.upsert(item).unwrap();
        assert_eq!(cal.items().len(), 1);
        assert_eq!(cal.items()[0].title, "v2");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let ctx = AppContext::in_memory();
        let cal = ContentCalendar::mount(&ctx);
        let item = idea("once", &[]);
        cal.add(item.clone()).unwrap();
        assert!(matches!(cal.add(item), Err(CadenceError::Validation(_))));
    }
}
