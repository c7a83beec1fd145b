use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::builders::storage::{FilePreferences, PreferenceStore};
use crate::core::exclusions::FileExclusion;
use crate::core::properties::{ExtraProperty, MarkerSeverity};
use crate::core::rules::RuleExclusion;
use crate::core::store::ExclusionStore;
use crate::core::trigger::AnalysisTrigger;

/// Environment variable overriding the global preference file location.
pub const PREFS_ENV_VAR: &str = "LINT_EXCLUSIONS_PREFS";

const APP_DIR: &str = "lint-exclusions";
const PREFS_FILE: &str = "preferences.json";

/// One excluded rule as written by `export`.
#[derive(Debug, Serialize)]
pub struct ExportedRule {
    pub rule: String,
    pub display_name: String,
}

impl From<RuleExclusion> for ExportedRule {
    fn from(exclusion: RuleExclusion) -> Self {
        Self {
            rule: exclusion.rule_identifier.to_string(),
            display_name: exclusion.display_name,
        }
    }
}

/// Everything configured in one preference scope, in a form suitable for export.
#[derive(Debug, Serialize)]
pub struct PreferencesSnapshot {
    pub marker_severity: MarkerSeverity,
    pub test_file_patterns: String,
    pub rule_exclusions: Vec<ExportedRule>,
    pub file_exclusions: Vec<FileExclusion>,
    pub extra_properties: Vec<ExtraProperty>,
}

impl PreferencesSnapshot {
    pub fn capture<P: PreferenceStore>(store: &ExclusionStore<P>) -> Self {
        Self {
            marker_severity: store.marker_severity(),
            test_file_patterns: store.test_file_globs(),
            rule_exclusions: store.excluded_rules().into_iter().map(ExportedRule::from).collect(),
            file_exclusions: store.global_file_exclusions(),
            extra_properties: store.extra_properties(),
        }
    }
}

/// Locates the preference files and opens stores over them.
pub struct ConfigManager {
    prefs_path: PathBuf,
    project_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Resolves the global preference file: an explicit path first, then
    /// `LINT_EXCLUSIONS_PREFS`, then the per-user configuration directory.
    pub fn new(prefs_path: Option<PathBuf>, project_path: Option<PathBuf>) -> Result<Self> {
        let prefs_path = match prefs_path {
            Some(path) => path,
            None => default_prefs_path()?,
        };

        Ok(Self {
            prefs_path,
            project_path,
        })
    }

    pub fn new_at(prefs_path: PathBuf) -> Self {
        Self {
            prefs_path,
            project_path: None,
        }
    }

    /// Creates an empty preference file if none exists yet.
    pub fn initialize(&self) -> Result<()> {
        let mut prefs = FilePreferences::open(&self.prefs_path);
        if prefs.exists() {
            return Ok(());
        }

        prefs.flush().context("Failed to create preference file")?;
        info!(path = %self.prefs_path.display(), "Created preference file");
        Ok(())
    }

    pub fn open_store(&self, trigger: Arc<dyn AnalysisTrigger>) -> ExclusionStore<FilePreferences> {
        ExclusionStore::new(FilePreferences::open(&self.prefs_path)).with_trigger(trigger)
    }

    /// Project scoped preferences, when a project file was configured.
    pub fn open_project(&self) -> Option<FilePreferences> {
        self.project_path.as_ref().map(|path| FilePreferences::open(path))
    }

    pub fn export_preferences<P: PreferenceStore>(
        &self,
        store: &ExclusionStore<P>,
        file_path: &Path,
        format: &str,
    ) -> Result<()> {
        let snapshot = PreferencesSnapshot::capture(store);

        let content = match format {
            "json" => {
                serde_json::to_string_pretty(&snapshot).context("Failed to serialize to JSON")?
            }
            "yaml" => serde_yaml::to_string(&snapshot).context("Failed to serialize to YAML")?,
            "toml" => toml::to_string_pretty(&snapshot).context("Failed to serialize to TOML")?,
            other => anyhow::bail!("Unsupported export format: {other}"),
        };

        fs::write(file_path, content).context("Failed to write export file")?;
        Ok(())
    }

    pub fn prefs_path(&self) -> &Path {
        &self.prefs_path
    }
}

fn default_prefs_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(PREFS_ENV_VAR)
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().context("Could not determine the user configuration directory")?;
    Ok(config_dir.join(APP_DIR).join(PREFS_FILE))
}
