//! Calculation history, newest first, optionally persisted as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ITEMS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub expression: String,
    pub result: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct ExportedItem<'a> {
    expression: &'a str,
    result: f64,
    date: String,
}

pub struct HistoryManager {
    items: Vec<HistoryItem>,
    max_items: usize,
    path: Option<PathBuf>,
}

impl HistoryManager {
    pub fn in_memory(max_items: usize) -> Self {
        HistoryManager {
            items: Vec::new(),
            max_items,
            path: None,
        }
    }

    /// Loads history from `path` and saves back to it on every change. A
    /// missing or unreadable file starts an empty history.
    pub fn open(path: impl Into<PathBuf>, max_items: usize) -> Self {
        let path = path.into();
        let mut items = match load(&path) {
            Ok(items) => items,
            Err(e) => {
                log::error!("Failed to load history: {:#}", e);
                Vec::new()
            }
        };
        items.truncate(max_items);
        log::debug!("loaded {} history items from {}", items.len(), path.display());

        HistoryManager {
            items,
            max_items,
            path: Some(path),
        }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records a result and returns the new entry, or `None` when the history
    /// keeps no entries at all.
    pub fn add(&mut self, expression: &str, result: f64) -> Option<&HistoryItem> {
        self.add_at(expression, result, Utc::now())
    }

    pub fn add_at(&mut self, expression: &str, result: f64, timestamp: DateTime<Utc>) -> Option<&HistoryItem> {
        // Millisecond ids, bumped so two entries in the same instant stay distinct.
        let newest = self.items.first().map_or(i64::MIN, |item| item.id);
        let id = timestamp.timestamp_millis().max(newest.saturating_add(1));

        self.items.insert(
            0,
            HistoryItem {
                id,
                expression: expression.to_string(),
                result,
                timestamp,
            },
        );
        self.items.truncate(self.max_items);
        self.persist();
        self.items.first()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string(&self.items)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Writes a human-readable copy of the history to `path`.
    pub fn export(&self, path: &Path) -> Result<usize> {
        let data: Vec<ExportedItem> = self
            .items
            .iter()
            .map(|item| ExportedItem {
                expression: &item.expression,
                result: item.result,
                date: item
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json).with_context(|| format!("exporting history to {}", path.display()))?;
        log::info!("exported {} history items to {}", data.len(), path.display());
        Ok(data.len())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save history: {:#}", e);
        }
    }
}

fn load(path: &Path) -> Result<Vec<HistoryItem>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Relative age of an entry: "Just now", "5m ago", "3h ago", then the date.
pub fn format_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);

    if diff.num_seconds() < 60 {
        "Just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else {
        timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    #[test]
    fn newest_first_and_capped() {
        let mut history = HistoryManager::in_memory(3);
        for i in 0..5 {
            history.add(&format!("{i}+0"), i as f64);
        }
        let exprs: Vec<_> = history.items().iter().map(|i| i.expression.as_str()).collect();
        assert_eq!(exprs, ["4+0", "3+0", "2+0"]);
    }

    #[test]
    fn ids_are_unique_within_one_instant() {
        let now = Utc::now();
        let mut history = HistoryManager::in_memory(10);
        let a = history.add_at("1", 1.0, now).map(|item| item.id);
        let b = history.add_at("2", 2.0, now).map(|item| item.id);
        assert!(a.is_some());
        assert_ne!(a, b);
        assert_eq!(history.items()[0].id, b.unwrap());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = HistoryManager::in_memory(0);
        assert_eq!(history.add("1+1", 2.0), None);
        assert!(history.is_empty());
    }

    #[test]
    fn persists_between_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryManager::open(&path, 50);
        assert!(history.is_empty());
        history.add("2+2", 4.0);
        history.add("3*3", 9.0);

        let mut reopened = HistoryManager::open(&path, 50);
        assert_eq!(reopened.items(), history.items());

        reopened.clear();
        assert!(HistoryManager::open(&path, 50).is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        assert!(HistoryManager::open(&path, 50).is_empty());
    }

    #[test]
    fn export_writes_readable_entries() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("export.json");

        let mut history = HistoryManager::in_memory(50);
        history.add("sqrt(16)", 4.0);
        assert_eq!(history.export(&out).unwrap(), 1);

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value[0]["expression"], "sqrt(16)");
        assert_eq!(value[0]["result"], 4.0);
        assert!(value[0]["date"].is_string());
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(format_time(now - Duration::seconds(30), now), "Just now");
        assert_eq!(format_time(now + Duration::seconds(5), now), "Just now");
        assert_eq!(format_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_time(now - Duration::hours(3), now), "3h ago");
        assert!(format_time(now - Duration::days(5), now).starts_with("2024-03-1"));
    }
}
