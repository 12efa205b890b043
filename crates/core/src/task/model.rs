//! Task book state
//!
//! Pure in-memory operations on the date-keyed task mapping; persistence
//! lives in the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mapping from ISO date (`YYYY-MM-DD`) to the ordered tasks of that day.
///
/// ISO date keys are string-sortable, so BTreeMap iteration order is
/// chronological. A date key is present only while its bucket is
/// non-empty; task numbers shown to the user are the current 1-based
/// index within a bucket and are recomputed on every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBook {
    buckets: BTreeMap<String, Vec<String>>,
}

impl TaskBook {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Append a task to the bucket for `date`, creating the bucket if
    /// absent. Returns the task's 1-based position.
    pub fn add(&mut self, date: &str, text: &str) -> usize {
        let bucket = self.buckets.entry(date.to_string()).or_default();
        bucket.push(text.to_string());
        bucket.len()
    }

    pub fn tasks_on(&self, date: &str) -> Option<&[String]> {
        self.buckets.get(date).map(|bucket| bucket.as_slice())
    }

    pub fn bucket_len(&self, date: &str) -> Option<usize> {
        self.buckets.get(date).map(Vec::len)
    }

    /// Remove the whole bucket for `date`.
    pub fn remove_bucket(&mut self, date: &str) -> bool {
        self.buckets.remove(date).is_some()
    }

    /// Remove the task at 1-based `number` within the bucket for `date`,
    /// dropping the bucket when it empties. Returns the removed text.
    pub fn remove_at(&mut self, date: &str, number: usize) -> Option<String> {
        let bucket = self.buckets.get_mut(date)?;
        if number == 0 || number > bucket.len() {
            return None;
        }
        let removed = bucket.remove(number - 1);
        if bucket.is_empty() {
            self.buckets.remove(date);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Drop every bucket dated strictly before `today`, along with empty
    /// buckets and keys that are not valid ISO dates (manual edits).
    /// Reports whether anything changed.
    pub fn prune_before(&mut self, today: NaiveDate) -> bool {
        let before = self.buckets.len();
        self.buckets.retain(|date, tasks| {
            !tasks.is_empty()
                && NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map(|d| d >= today)
                    .unwrap_or(false)
        });
        before != self.buckets.len()
    }

    /// Render the user-facing listing.
    ///
    /// With `specific_date`, the bucket for that date or an explicit
    /// "no tasks on this date" line. Without it, today's bucket first
    /// under its own heading, then the remaining buckets in ascending
    /// date order. An empty book renders as "list is empty".
    pub fn render(&self, specific_date: Option<&str>, today: NaiveDate) -> String {
        if self.buckets.is_empty() {
            return "Список задач пуст.".to_string();
        }

        if let Some(date) = specific_date {
            return match self.buckets.get(date).filter(|tasks| !tasks.is_empty()) {
                Some(tasks) => format!("Задачи на {}:\n{}", date, numbered(tasks, "")),
                None => format!("На {} задач нет.", date),
            };
        }

        let today_str = today.to_string();
        let mut parts: Vec<String> = Vec::new();

        if let Some(tasks) = self.buckets.get(&today_str).filter(|tasks| !tasks.is_empty()) {
            parts.push("--- Задачи на сегодня ---".to_string());
            parts.push(numbered(tasks, "  "));
        }

        let mut other: Vec<String> = Vec::new();
        for (date, tasks) in &self.buckets {
            if date == &today_str || tasks.is_empty() {
                continue;
            }
            other.push(format!("{}:\n{}", date, numbered(tasks, "  ")));
        }
        if !other.is_empty() {
            parts.push("--- Остальные задачи ---".to_string());
            parts.push(other.join("\n\n"));
        }

        if parts.is_empty() {
            return "Список задач пуст.".to_string();
        }
        parts.join("\n\n")
    }
}

fn numbered(tasks: &[String], indent: &str) -> String {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}{}. {}", indent, i + 1, task))
        .collect::<Vec<_>>()
        .join("\n")
}
