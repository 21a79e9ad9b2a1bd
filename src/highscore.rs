//! Best-score persistence
//!
//! The best score is a single integer. On disk it lives in
//! `best_score.toml` in the platform data directory (for example
//! `~/.local/share/blokk/best_score.toml`).

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Where the best score is loaded from and saved to
pub trait BestScoreStore {
    /// Stored best score, 0 when absent or unreadable
    fn load_best_score(&self) -> u64;

    /// Persist a new best score
    fn save_best_score(&mut self, score: u64) -> Result<(), String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct BestScoreRecord {
    best_score: u64,
}

/// Best score stored as a TOML file
#[derive(Debug, Clone)]
pub struct BestScoreFile {
    path: Option<PathBuf>,
}

impl BestScoreFile {
    /// Store in the platform data directory
    pub fn new() -> Self {
        let path = ProjectDirs::from("com", "blokk", "blokk")
            .map(|dirs| dirs.data_dir().join("best_score.toml"));
        if path.is_none() {
            tracing::warn!("Could not determine data directory, best score will not persist");
        }
        Self { path }
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl Default for BestScoreFile {
    fn default() -> Self {
        Self::new()
    }
}

impl BestScoreStore for BestScoreFile {
    fn load_best_score(&self) -> u64 {
        let Some(path) = &self.path else {
            return 0;
        };

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<BestScoreRecord>(&contents) {
                Ok(record) => record.best_score,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable best score file {}: {}", path.display(), e);
                    0
                }
            },
            Err(_) => 0,
        }
    }

    fn save_best_score(&mut self, score: u64) -> Result<(), String> {
        let Some(path) = &self.path else {
            return Err("Could not determine best score path".to_string());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| format!("Failed to create data dir: {}", e))?;
        }

        let contents = toml::to_string(&BestScoreRecord { best_score: score })
            .map_err(|e| format!("Failed to serialize: {}", e))?;

        fs::write(path, contents).map_err(|e| format!("Failed to write best score: {}", e))?;

        Ok(())
    }
}

/// Best score kept in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub best_score: u64,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryStore {
    pub fn new(best_score: u64) -> Self {
        Self {
            best_score,
            saves: 0,
        }
    }
}

impl BestScoreStore for MemoryStore {
    fn load_best_score(&self) -> u64 {
        self.best_score
    }

    fn save_best_score(&mut self, score: u64) -> Result<(), String> {
        self.best_score = score;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("blokk-test-{}-{}", std::process::id(), name))
            .join("best_score.toml")
    }

    #[test]
    fn test_missing_file_loads_zero() {
        let store = BestScoreFile::at(temp_path("missing"));
        assert_eq!(store.load_best_score(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let mut store = BestScoreFile::at(&path);
        store.save_best_score(321).unwrap();

        let reopened = BestScoreFile::at(&path);
        assert_eq!(reopened.load_best_score(), 321);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_garbage_file_loads_zero() {
        let path = temp_path("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "best_score = \"lots\"").unwrap();

        assert_eq!(BestScoreFile::at(&path).load_best_score(), 0);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unwritable_path_reports_error() {
        let blocker = temp_path("blocker");
        let dir = blocker.parent().unwrap().to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        // A regular file where a directory is needed
        let file = dir.join("not-a-dir");
        fs::write(&file, "").unwrap();

        let mut store = BestScoreFile::at(file.join("best_score.toml"));
        assert!(store.save_best_score(5).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new(10);
        assert_eq!(store.load_best_score(), 10);
        store.save_best_score(20).unwrap();
        assert_eq!(store.load_best_score(), 20);
        assert_eq!(store.saves, 1);
    }
}
