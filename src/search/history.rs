use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const MAX_HISTORY: usize = 10;

/// Recently searched Riot IDs, most recent first, kept on disk between runs.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    path: PathBuf,
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new(path: &Path) -> Self {
        SearchHistory {
            path: path.to_path_buf(),
            entries: Vec::new(),
        }
    }

    /// Missing or unreadable history loads as empty.
    pub fn load(path: &Path) -> Self {
        let mut history = Self::new(path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return history,
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(entries) => {
                // oldest first so that `record` leaves the newest at the front
                for entry in entries.iter().rev() {
                    history.record(entry);
                }
            }
            Err(e) => {
                tracing::warn!("Ignoring corrupt search history at {}: {}", path.display(), e);
            }
        }
        history
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize search history: {}", e))
        })?;

        fs::write(&self.path, json).map_err(|e| {
            AppError::StorageError(format!("Failed to write search history: {}", e))
        })?;

        Ok(())
    }

    /// Moves `riot_id` to the front, replacing any entry that differs only in case.
    pub fn record(&mut self, riot_id: &str) {
        let riot_id = riot_id.trim();
        if riot_id.is_empty() {
            return;
        }
        let key = riot_id.to_lowercase();
        self.entries.retain(|existing| existing.to_lowercase() != key);
        self.entries.insert(0, riot_id.to_string());
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries starting with `prefix`, ignoring case.
    pub fn matching(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history_with(entries: &[&str]) -> SearchHistory {
        let mut history = SearchHistory::new(Path::new("unused.json"));
        for entry in entries.iter().rev() {
            history.record(entry);
        }
        history
    }

    #[test]
    fn test_record_dedups_case_insensitively() {
        let mut history = history_with(&["Foo#1", "Bar#2"]);
        history.record("foo#1");
        assert_eq!(history.entries(), &["foo#1".to_string(), "Bar#2".to_string()]);
    }

    #[test]
    fn test_record_caps_at_ten() {
        let mut history = history_with(&[]);
        for n in 0..15 {
            history.record(&format!("Player{}#EUW", n));
        }
        assert_eq!(history.entries().len(), MAX_HISTORY);
        assert_eq!(history.entries()[0], "Player14#EUW");
        assert_eq!(history.entries()[9], "Player5#EUW");
    }

    #[test]
    fn test_matching_prefix() {
        let history = history_with(&["Faker#KR1", "fakerfan#NA1", "Caps#EUW"]);
        assert_eq!(history.matching("FAK"), vec!["Faker#KR1", "fakerfan#NA1"]);
        assert_eq!(history.matching("").len(), 3);
        assert!(history.matching("zzz").is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = SearchHistory::load(&path);
        assert!(history.entries().is_empty());
        history.record("Foo#1");
        history.record("Bar#2");
        history.save().unwrap();

        let reloaded = SearchHistory::load(&path);
        assert_eq!(reloaded.entries(), &["Bar#2".to_string(), "Foo#1".to_string()]);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let history = SearchHistory::load(&path);
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_load_sanitizes_stored_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let stored: Vec<String> = (0..12).map(|n| format!("P{}#1", n)).chain(["p0#1".to_string()]).collect();
        fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        let history = SearchHistory::load(&path);
        assert_eq!(history.entries().len(), MAX_HISTORY);
        assert_eq!(history.entries()[0], "P0#1");
    }
}
