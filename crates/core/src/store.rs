use crate::position::Position;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// File-backed store for the single open position.
///
/// The position is the only state that must survive a restart; everything
/// else is re-derived from fresh history. Writes go through a temp file and
/// rename so a crash mid-write never leaves a half-written file. A missing or
/// unparseable file always loads as flat.
#[derive(Debug, Clone)]
pub struct PositionStore {
    path: PathBuf,
}

impl PositionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted position. Absent or corrupt storage means "no open
    /// position", never an error that halts the loop.
    #[must_use]
    pub fn load(&self) -> Option<Position> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        match serde_json::from_str::<Option<Position>>(&raw) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unparseable position file, treating as flat"
                );
                None
            }
        }
    }

    /// Persists the position (or `null` when flat) atomically.
    ///
    /// # Errors
    /// Returns an error if the temp file cannot be written or renamed.
    pub fn save(&self, position: Option<&Position>) -> Result<()> {
        let json = serde_json::to_string(&position)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to rename into {}", self.path.display()))?;
        Ok(())
    }
}
