//! Per-session bar cache.
//!
//! Each tick's history fetch is merged into a CSV keyed by bar timestamp,
//! last write wins, and the file is erased after the session close. Nothing
//! outlives the trading day.

use anyhow::{Context, Result};
use band_trade_core::Bar;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Merges `bars` into the cache, deduplicating by timestamp with the
    /// newest write winning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn append(&self, bars: &[Bar]) -> Result<()> {
        let mut merged: BTreeMap<_, Bar> =
            self.load().into_iter().map(|b| (b.timestamp, b)).collect();
        for bar in bars {
            merged.insert(bar.timestamp, *bar);
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        for bar in merged.values() {
            writer.serialize(bar)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads the cached session bars in timestamp order. A missing or
    /// unreadable cache reads as empty; bad rows are skipped.
    #[must_use]
    pub fn load(&self) -> Vec<Bar> {
        let Ok(mut reader) = csv::Reader::from_path(&self.path) else {
            return Vec::new();
        };
        reader.deserialize().filter_map(std::result::Result::ok).collect()
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Erases the cache at session end.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(minute: u32, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 14, minute, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn append_and_load_roundtrip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("market_data.csv"));
        cache.append(&[bar(2, 101.0), bar(1, 100.0)]).unwrap();

        let bars = cache.load();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn duplicate_timestamps_resolve_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("market_data.csv"));
        cache.append(&[bar(1, 100.0)]).unwrap();
        cache.append(&[bar(1, 105.0), bar(2, 106.0)]).unwrap();

        let bars = cache.load();
        assert_eq!(bars.len(), 2);
        assert!((bars[0].close - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("market_data.csv"));
        assert!(cache.load().is_empty());
        assert!(!cache.exists());
    }

    #[test]
    fn clear_removes_the_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SessionCache::new(dir.path().join("market_data.csv"));
        cache.append(&[bar(1, 100.0)]).unwrap();
        assert!(cache.exists());

        cache.clear().unwrap();
        assert!(!cache.exists());
        cache.clear().unwrap();
    }
}
