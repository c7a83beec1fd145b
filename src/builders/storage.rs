use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A flat, string-keyed preference node.
///
/// `set` and `remove` change the in-memory view immediately; `flush` persists
/// it. Callers that need durability call `flush` after every write.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn flush(&mut self) -> Result<()>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Preferences stored in a JSON file as a single flat object of strings.
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens the preference file at `path`.
    ///
    /// A missing file reads as empty. A file that cannot be read or parsed is
    /// copied to `<file>.bak` and then also reads as empty, so the next
    /// `flush` does not destroy the only copy of its contents.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match load_values(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "Ignoring unreadable preference file");
                if let Err(e) = back_up(&path) {
                    warn!(path = %path.display(), error = %format!("{e:#}"), "Could not back up preference file");
                }
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn load_values(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path).context("Failed to read preference file")?;
    serde_json::from_str(&content).context("Failed to parse preference file")
}

/// Path of the copy kept when a preference file cannot be loaded.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

fn back_up(path: &Path) -> Result<()> {
    let backup = backup_path(path);
    fs::copy(path, &backup).context("Failed to copy preference file")?;
    warn!(backup = %backup.display(), "Kept a copy of the unreadable preference file");
    Ok(())
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create preference directory")?;
        }

        let content =
            serde_json::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        fs::write(&self.path, content).context("Failed to write preference file")?;
        debug!(path = %self.path.display(), "Flushed preferences");
        Ok(())
    }
}

/// Preferences kept only in memory. `flush` is a no-op.
#[derive(Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_preferences() {
        let mut prefs = MemoryPreferences::new();
        assert_eq!(prefs.get("ruleExclusions"), None);
        assert_eq!(prefs.get_or("ruleExclusions", ""), "");

        prefs.set("ruleExclusions", "java:S1:".to_string());
        assert_eq!(prefs.get("ruleExclusions").as_deref(), Some("java:S1:"));

        prefs.remove("ruleExclusions");
        assert_eq!(prefs.get("ruleExclusions"), None);
        assert!(prefs.flush().is_ok());
    }

    #[test]
    fn test_file_preferences_persist_after_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut prefs = FilePreferences::open(&path);
        assert!(!prefs.exists());
        prefs.set("fileExclusions", "FILE:a.txt\r\nDIRECTORY:out".to_string());
        prefs.flush().unwrap();

        let reopened = FilePreferences::open(&path);
        assert_eq!(
            reopened.get("fileExclusions").as_deref(),
            Some("FILE:a.txt\r\nDIRECTORY:out")
        );
    }

    #[test]
    fn test_unflushed_changes_are_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let mut prefs = FilePreferences::open(&path);
        prefs.set("extraArgs", "a=b".to_string());
        assert_eq!(prefs.get("extraArgs").as_deref(), Some("a=b"));

        let reopened = FilePreferences::open(&path);
        assert_eq!(reopened.get("extraArgs"), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        let prefs = FilePreferences::open(&path);
        assert_eq!(prefs.get("ruleExclusions"), None);
    }

    #[test]
    fn test_corrupt_file_is_backed_up_before_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let original = r#"{ "ruleExclusions": "java:S1:b25l", "extraArgs": "a=b" "#;
        fs::write(&path, original).unwrap();

        let mut prefs = FilePreferences::open(&path);
        prefs.set("markerSeverity", "1".to_string());
        prefs.flush().unwrap();

        let backup = backup_path(&path);
        assert_eq!(backup, dir.path().join("preferences.json.bak"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), original);
        assert_eq!(FilePreferences::open(&path).get("markerSeverity").as_deref(), Some("1"));
    }

    #[test]
    fn test_missing_file_is_not_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let prefs = FilePreferences::open(&path);
        assert!(!prefs.exists());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let dir = tempdir().unwrap();
        // The parent "directory" is a regular file, so the write cannot succeed.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut prefs = FilePreferences::open(blocker.join("preferences.json"));
        prefs.set("ruleExclusions", String::new());
        assert!(prefs.flush().is_err());
        assert_eq!(prefs.get("ruleExclusions").as_deref(), Some(""));
    }
}
