// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily planner: days holding time-boxed items.
//!
//! Mounting the planner runs a one-time sanitation pass over every stored
//! item. Invalid time fields are repaired so that, for every item with both
//! times set, hours are at most 23, `end >= start`, and the item lasts at
//! least five minutes. The repaired list is written back only if something
//! actually changed.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cadence_core::{CadenceError, StorageKey};

use crate::context::{new_id, AppContext};
use crate::hook::PersistedState;

/// Last minute of the day, `23:59`.
const END_OF_DAY: u32 = 23 * 60 + 59;
/// Start used when an item would otherwise not fit before midnight, `22:59`.
const LATE_START: u32 = 22 * 60 + 59;
/// Shortest allowed item, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;
/// Length given to items that were too short, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// One time-boxed entry on a planner day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerItem {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// A calendar date with its ordered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub items: Vec<PlannerItem>,
}

impl PlannerDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
        }
    }
}

/// Splits `HH:MM` into raw hour and minute numbers, without range checks.
pub fn parse_hhmm(value: &str) -> Option<(u32, u32)> {
    let (hour, minute) = value.trim().split_once(':')?;
    if hour.is_empty() || minute.is_empty() {
        return None;
    }
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Minutes since midnight for a stored time. Only meaningful after sanitation.
fn to_minutes(value: &str) -> Option<u32> {
    parse_hhmm(value).map(|(h, m)| h * 60 + m)
}

/// Normalizes one time field. Returns whether it changed.
fn sanitize_time(slot: &mut Option<String>) -> bool {
    let Some(raw) = slot.as_deref() else {
        return false;
    };
    let fixed = match parse_hhmm(raw) {
        None => None,
        Some((hour, _)) if hour > 23 => Some(format_minutes(END_OF_DAY)),
        Some((hour, minute)) => Some(format_minutes(hour * 60 + minute.min(59))),
    };
    if fixed.as_deref() == Some(raw) {
        return false;
    }
    *slot = fixed;
    true
}

/// Repairs one item in place. Returns whether anything changed.
pub fn sanitize_item(item: &mut PlannerItem) -> bool {
    let mut changed = false;
    if item.id.is_empty() {
        item.id = new_id();
        changed = true;
    }
    changed |= sanitize_time(&mut item.start_time);
    changed |= sanitize_time(&mut item.end_time);

    let times = (
        item.start_time.as_deref().and_then(to_minutes),
        item.end_time.as_deref().and_then(to_minutes),
    );
    if let (Some(mut start), Some(end)) = times {
        if end >= start + MIN_DURATION_MINUTES {
            return changed;
        }
        let end = (start + DEFAULT_DURATION_MINUTES).min(END_OF_DAY);
        if end < start + MIN_DURATION_MINUTES {
            start = LATE_START;
            item.start_time = Some(format_minutes(start));
        }
        item.end_time = Some(format_minutes(end));
        changed = true;
    }
    changed
}

/// Repairs every item of every day. Returns whether a write-back is needed.
pub fn sanitize_days(days: &mut [PlannerDay]) -> bool {
    let mut repaired = 0usize;
    for day in days.iter_mut() {
        for item in &mut day.items {
            if sanitize_item(item) {
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        info!(repaired, "repaired planner items");
    }
    repaired > 0
}

/// Strict check for user-entered times.
fn validate_time(value: Option<&str>) -> Result<(), CadenceError> {
    match value {
        None => Ok(()),
        Some(v) => match parse_hhmm(v) {
            Some((h, m)) if h <= 23 && m <= 59 => Ok(()),
            _ => Err(CadenceError::Validation(format!(
                "invalid time '{v}', expected HH:MM"
            ))),
        },
    }
}

fn validate_item(item: &PlannerItem) -> Result<(), CadenceError> {
    if item.text.trim().is_empty() {
        return Err(CadenceError::Validation("item text must not be empty".into()));
    }
    validate_time(item.start_time.as_deref())?;
    validate_time(item.end_time.as_deref())
}

fn day_mut(days: &mut Vec<PlannerDay>, date: NaiveDate) -> &mut PlannerDay {
    // Stored lists are not guaranteed to be sorted.
    let idx = match days.iter().position(|d| d.date == date) {
        Some(idx) => idx,
        None => {
            let idx = days.partition_point(|d| d.date < date);
            days.insert(idx, PlannerDay::new(date));
            idx
        }
    };
    &mut days[idx]
}

fn item_not_found(id: &str) -> CadenceError {
    CadenceError::NotFound {
        kind: "planner item",
        id: id.to_string(),
    }
}

fn find_item<'a>(
    days: &'a mut [PlannerDay],
    date: NaiveDate,
    id: &str,
) -> Result<&'a mut PlannerItem, CadenceError> {
    days.iter_mut()
        .find(|d| d.date == date)
        .and_then(|d| d.items.iter_mut().find(|i| i.id == id))
        .ok_or_else(|| item_not_found(id))
}

/// The mounted planner.
pub struct Planner {
    state: PersistedState<Vec<PlannerDay>>,
}

impl Planner {
    /// Loads planner days and runs the sanitation pass.
    pub fn mount(ctx: &AppContext) -> Self {
        Self {
            state: PersistedState::hydrate_with(
                ctx,
                StorageKey::PlannerData,
                |days: &mut Vec<PlannerDay>| sanitize_days(days),
            ),
        }
    }

    pub fn state(&self) -> &PersistedState<Vec<PlannerDay>> {
        &self.state
    }

    pub fn days(&self) -> Vec<PlannerDay> {
        self.state.snapshot()
    }

    pub fn day(&self, date: NaiveDate) -> Option<PlannerDay> {
        self.state.read(|days| days.iter().find(|d| d.date == date).cloned())
    }

    /// Replaces all planner days.
    pub fn save_planner_data(&self, mut days: Vec<PlannerDay>) -> Result<(), CadenceError> {
        days.sort_by_key(|d| d.date);
        self.state.save(days)
    }

    /// Appends an item to `date`, creating the day if needed. Returns the item id.
    pub fn add_item(&self, date: NaiveDate, mut item: PlannerItem) -> Result<String, CadenceError> {
        validate_item(&item)?;
        item.text = item.text.trim().to_string();
        sanitize_item(&mut item);
        let id = item.id.clone();
        self.state.modify(|days| {
            day_mut(days, date).items.push(item);
            Ok(())
        })?;
        debug!(%date, %id, "planner item added");
        Ok(id)
    }

    /// Applies `edit` to one item and re-validates it.
    pub fn edit_item(
        &self,
        date: NaiveDate,
        id: &str,
        edit: impl FnOnce(&mut PlannerItem),
    ) -> Result<(), CadenceError> {
        self.state.modify(|days| {
            let item = find_item(days, date, id)?;
            edit(item);
            item.id = id.to_string();
            validate_item(item)?;
            sanitize_item(item);
            Ok(())
        })
    }

    pub fn delete_item(&self, date: NaiveDate, id: &str) -> Result<(), CadenceError> {
        self.state.modify(|days| {
            let day = days
                .iter_mut()
                .find(|d| d.date == date)
                .ok_or_else(|| item_not_found(id))?;
            let before = day.items.len();
            day.items.retain(|i| i.id != id);
            if day.items.len() == before {
                return Err(item_not_found(id));
            }
            Ok(())
        })
    }

    /// Flips completion. Returns the new state.
    pub fn toggle_item(&self, date: NaiveDate, id: &str) -> Result<bool, CadenceError> {
        self.state.modify(|days| {
            let item = find_item(days, date, id)?;
            item.completed = !item.completed;
            Ok(item.completed)
        })
    }

    /// Drag-and-drop: moves an item to position `index` on `to` (clamped).
    pub fn move_item(
        &self,
        from: NaiveDate,
        id: &str,
        to: NaiveDate,
        index: usize,
    ) -> Result<(), CadenceError> {
        self.state.modify(|days| {
            let source = days
                .iter_mut()
                .find(|d| d.date == from)
                .ok_or_else(|| item_not_found(id))?;
            let pos = source
                .items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| item_not_found(id))?;
            let item = source.items.remove(pos);

            let target = day_mut(days, to);
            let index = index.min(target.items.len());
            target.items.insert(index, item);
            Ok(())
        })?;
        debug!(%from, %to, index, id, "planner item moved");
        Ok(())
    }

    /// Seven consecutive days starting at `start`, empty days included.
    pub fn week(&self, start: NaiveDate) -> Vec<PlannerDay> {
        self.state.read(|days| {
            (0..7u64)
                .filter_map(|offset| start.checked_add_days(Days::new(offset)))
                .map(|date| {
                    days.iter()
                        .find(|d| d.date == date)
                        .cloned()
                        .unwrap_or_else(|| PlannerDay::new(date))
                })
                .collect()
        })
    }

    /// Runs the sanitation pass again. Returns whether anything was repaired.
    pub fn sanitize(&self) -> Result<bool, CadenceError> {
        let mut days = self.state.snapshot();
        if !sanitize_days(&mut days) {
            return Ok(false);
        }
        self.state.save(days)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn item(text: &str, start: Option<&str>, end: Option<&str>) -> PlannerItem {
        PlannerItem {
            id: "i-1".into(),
            text: text.into(),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn hour_past_midnight_becomes_end_of_day() {
        let mut it = item("Write script", Some("25:30"), None);
        assert!(sanitize_item(&mut it));
        assert_eq!(it.start_time.as_deref(), Some("23:59"));
    }

    #[test]
    fn short_item_is_stretched_to_an_hour() {
        let mut it = item("Film", Some("10:00"), Some("10:02"));
        assert!(sanitize_item(&mut it));
        assert_eq!(it.end_time.as_deref(), Some("11:00"));
    }

    #[test]
    fn inverted_item_is_stretched() {
        let mut it = item("Edit", Some("14:00"), Some("09:00"));
        sanitize_item(&mut it);
        assert_eq!(it.end_time.as_deref(), Some("15:00"));
    }

    #[test]
    fn stretch_is_capped_at_end_of_day() {
        let mut it = item("Post", Some("23:30"), Some("23:31"));
        sanitize_item(&mut it);
        assert_eq!(it.start_time.as_deref(), Some("23:30"));
        assert_eq!(it.end_time.as_deref(), Some("23:59"));
    }

    #[test]
    fn start_too_late_to_fit_moves_earlier() {
        let mut it = item("Late", Some("26:00"), Some("23:59"));
        sanitize_item(&mut it);
        assert_eq!(it.start_time.as_deref(), Some("22:59"));
        assert_eq!(it.end_time.as_deref(), Some("23:59"));
    }

    #[test]
    fn minutes_are_clamped_and_garbage_cleared() {
        let mut it = item("x", Some("9:75"), Some("noon"));
        assert!(sanitize_item(&mut it));
        assert_eq!(it.start_time.as_deref(), Some("09:59"));
        assert_eq!(it.end_time, None);
    }

    #[test]
    fn valid_item_is_untouched() {
        let mut it = item("Ok", Some("08:00"), Some("09:30"));
        assert!(!sanitize_item(&mut it));
    }

    #[test]
    fn missing_id_is_filled() {
        let mut it = item("x", None, None);
        it.id.clear();
        assert!(sanitize_item(&mut it));
        assert!(!it.id.is_empty());
    }

    #[test]
    #[tracing_test::traced_test]
    fn mount_repairs_and_writes_back_once() {
        let ctx = AppContext::in_memory();
        ctx.storage
            .set_json(
                &StorageKey::PlannerData,
                &json!([{"date": "2026-03-02", "items": [
                    {"id": "a", "text": "Write script", "startTime": "25:30"}
                ]}]),
            )
            .unwrap();

        let planner = Planner::mount(&ctx);
        let day = planner.day(date("2026-03-02")).unwrap();
        assert_eq!(day.items[0].start_time.as_deref(), Some("23:59"));
        let seq = ctx.storage.backend().latest_change().unwrap();
        assert_eq!(seq, 2, "initial write plus one repair");
        assert!(logs_contain("repaired planner items"));

        let again = Planner::mount(&ctx);
        assert_eq!(again.days(), planner.days());
        assert_eq!(ctx.storage.backend().latest_change().unwrap(), seq);
    }

    #[test]
    fn mount_without_repairs_leaves_state_unchanged() {
        let ctx = AppContext::in_memory();
        ctx.storage
            .set_json(
                &StorageKey::PlannerData,
                &json!([{"date": "2026-03-02", "items": [
                    {"id": "a", "text": "Fine", "startTime": "08:00", "endTime": "09:00"}
                ]}]),
            )
            .unwrap();
        let planner = Planner::mount(&ctx);
        assert_eq!(planner.state().revision(), 0);
        assert_eq!(ctx.storage.backend().latest_change().unwrap(), 1);
    }

    #[test]
    fn add_validates_and_sorts_days() {
        let ctx = AppContext::in_memory();
        let planner = Planner::mount(&ctx);

        let err = planner
            .add_item(date("2026-03-03"), item("x", Some("24:00"), None))
            .unwrap_err();
        assert!(matches!(err, CadenceError::Validation(_)));
        let err = planner
            .add_item(date("2026-03-03"), item("   ", None, None))
            .unwrap_err();
        assert!(matches!(err, CadenceError::Validation(_)));

        planner
            .add_item(date("2026-03-04"), item("later", None, None))
            .unwrap();
        planner
            .add_item(date("2026-03-02"), item("earlier", None, None))
            .unwrap();
        let dates: Vec<_> = planner.days().iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2026-03-02"), date("2026-03-04")]);
    }

    #[test]
    fn edit_toggle_delete() {
        let ctx = AppContext::in_memory();
        let planner = Planner::mount(&ctx);
        let d = date("2026-03-02");
        let mut new = item("draft", Some("10:00"), Some("11:00"));
        new.id.clear();
        let id = planner.add_item(d, new).unwrap();

        planner
            .edit_item(d, &id, |i| i.end_time = Some("10:01".into()))
            .unwrap();
        assert_eq!(planner.day(d).unwrap().items[0].end_time.as_deref(), Some("11:00"));

        assert!(planner.toggle_item(d, &id).unwrap());
        assert!(!planner.toggle_item(d, &id).unwrap());

        planner.delete_item(d, &id).unwrap();
        assert!(planner.day(d).unwrap().items.is_empty());
        assert!(matches!(
            planner.delete_item(d, &id),
            Err(CadenceError::NotFound { .. })
        ));
    }

    #[test]
    fn move_between_days_and_positions() {
        let ctx = AppContext::in_memory();
        let planner = Planner::mount(&ctx);
        let mon = date("2026-03-02");
        let tue = date("2026-03-03");
        let mut ids = Vec::new();
        for text in ["a", "b", "c"] {
            let mut it = item(text, None, None);
            it.id.clear();
            ids.push(planner.add_item(mon, it).unwrap());
        }

        planner.move_item(mon, &ids[2], mon, 0).unwrap();
        let texts: Vec<_> = planner.day(mon).unwrap().items.into_iter().map(|i| i.text).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);

        planner.move_item(mon, &ids[0], tue, 99).unwrap();
        assert_eq!(planner.day(tue).unwrap().items[0].text, "a");
        assert_eq!(planner.day(mon).unwrap().items.len(), 2);
    }

    #[test]
    fn week_fills_empty_days() {
        let ctx = AppContext::in_memory();
        let planner = Planner::mount(&ctx);
        planner
            .add_item(date("2026-03-04"), item("mid-week", None, None))
            .unwrap();
        let week = planner.week(date("2026-03-02"));
        assert_eq!(week.len(), 7);
        assert_eq!(week[2].items.len(), 1);
        assert!(week[6].items.is_empty());
        assert_eq!(week[6].date, date("2026-03-08"));
    }

    #[test]
    fn save_in_one_component_reaches_the_other() {
        let ctx = AppContext::in_memory();
        let a = Planner::mount(&ctx);
        let b = Planner::mount(&ctx);

        let new_days = vec![PlannerDay {
            date: date("2026-03-05"),
            items: vec![item("Record voiceover", Some("09:00"), Some("10:00"))],
        }];
        a.save_planner_data(new_days.clone()).unwrap();
        assert_eq!(b.days(), new_days);
    }

    fn time_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            (0u32..40, 0u32..90).prop_map(|(h, m)| Some(format!("{h:02}:{m:02}"))),
            (0u32..30, 0u32..70).prop_map(|(h, m)| Some(format!("{h}:{m}"))),
            "[a-z:0-9]{0,6}".prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn sanitized_items_hold_the_time_invariant(start in time_strategy(), end in time_strategy()) {
            let mut it = PlannerItem {
                id: "p".into(),
                text: "t".into(),
                start_time: start,
                end_time: end,
                ..Default::default()
            };
            sanitize_item(&mut it);

            for t in [&it.start_time, &it.end_time].into_iter().flatten() {
                let (h, m) = parse_hhmm(t).unwrap();
                prop_assert!(h <= 23 && m <= 59);
            }
            if let (Some(s), Some(e)) = (&it.start_time, &it.end_time) {
                let s = to_minutes(s).unwrap();
                let e = to_minutes(e).unwrap();
                prop_assert!(e >= s);
                prop_assert!(e - s >= MIN_DURATION_MINUTES);
            }
            prop_assert!(!sanitize_item(&mut it), "second pass must be a no-op");
        }
    }
}
