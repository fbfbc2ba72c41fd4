//! Per-day, per-category alert lists on disk.
//!
//! The webhook receiver appends; the decision loop only reads. Files are
//! keyed by calendar date so a new session starts empty, and a missing or
//! corrupt file always reads as an empty list.

use crate::record::AlertRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    Oscillator,
    PriceAction,
    TrendCatcher,
    Exits,
}

impl AlertCategory {
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Oscillator => "lux_oscillator",
            Self::PriceAction => "lux_price_action",
            Self::TrendCatcher => "lux_trendcatcher",
            Self::Exits => "lux_exits",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertStore {
    dir: PathBuf,
}

impl AlertStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, category: AlertCategory, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{date}.json", category.file_prefix()))
    }

    /// Appends a record to the day's list and returns the new total.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn append(
        &self,
        category: AlertCategory,
        date: NaiveDate,
        record: AlertRecord,
    ) -> Result<usize> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(category, date);
        let mut records = read_records(&path);
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(records.len())
    }

    /// Loads the day's list. Absent or corrupt storage reads as empty.
    #[must_use]
    pub fn load(&self, category: AlertCategory, date: NaiveDate) -> Vec<AlertRecord> {
        read_records(&self.path_for(category, date))
    }
}

fn read_records(path: &Path) -> Vec<AlertRecord> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Corrupt alert file, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn record(text: &str) -> AlertRecord {
        AlertRecord::parse(text, "SPY", Utc.with_ymd_and_hms(2026, 8, 7, 14, 0, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn append_then_load_roundtrips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertStore::new(dir.path());

        assert_eq!(
            store
                .append(AlertCategory::Oscillator, today(), record("first"))
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .append(AlertCategory::Oscillator, today(), record("second"))
                .unwrap(),
            2
        );

        let records = store.load(AlertCategory::Oscillator, today());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].alert.as_deref(), Some("first"));
        assert_eq!(records[1].alert.as_deref(), Some("second"));
    }

    #[test]
    fn categories_and_dates_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertStore::new(dir.path());
        store
            .append(AlertCategory::Exits, today(), record("exit"))
            .unwrap();

        assert!(store.load(AlertCategory::Oscillator, today()).is_empty());
        let other_day = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert!(store.load(AlertCategory::Exits, other_day).is_empty());
    }

    #[test]
    fn corrupt_file_reads_empty_and_recovers_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = AlertStore::new(dir.path());
        let path = dir.path().join("lux_exits_2026-08-07.json");
        std::fs::write(&path, "[{ nope").unwrap();

        assert!(store.load(AlertCategory::Exits, today()).is_empty());
        store
            .append(AlertCategory::Exits, today(), record("fresh"))
            .unwrap();
        assert_eq!(store.load(AlertCategory::Exits, today()).len(), 1);
    }
}
