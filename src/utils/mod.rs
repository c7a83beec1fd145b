use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::builders::reporter::{ConsoleReporter, StatusReporter};
use crate::builders::storage::{FilePreferences, PreferenceStore};
use crate::builders::validator::{ExclusionValidator, StandardValidator};
use crate::core::config::ConfigManager;
use crate::core::exclusions::FileExclusion;
use crate::core::properties::{ExtraProperty, MarkerSeverity};
use crate::core::rules::{RuleExclusion, RuleIdentifier};
use crate::core::store::ExclusionStore;
use crate::core::trigger::LoggingTrigger;

pub fn initialize_preferences(config_manager: &ConfigManager) -> Result<()> {
    config_manager.initialize()?;
    println!(
        "✓ Initialized preferences at {}",
        config_manager.prefs_path().display()
    );
    Ok(())
}

pub fn exclude_rule(
    config_manager: &ConfigManager,
    rule: &str,
    display_name: Option<String>,
) -> Result<()> {
    let rule_identifier: RuleIdentifier = rule.parse()?;
    let exclusion = RuleExclusion::new(rule_identifier, display_name.unwrap_or_default());
    refuse_on_issues(StandardValidator::new().validate_rule_exclusion(&exclusion))?;

    let store = open_store(config_manager);
    if store.exclude_rule(exclusion) {
        println!("✓ Excluded rule {rule}");
    } else {
        println!("Rule {rule} is already excluded");
    }
    Ok(())
}

pub fn include_rule(config_manager: &ConfigManager, rule: &str) -> Result<()> {
    let rule_identifier: RuleIdentifier = rule.parse()?;
    let store = open_store(config_manager);
    if store.include_rule(&rule_identifier) {
        println!("✓ Rule {rule_identifier} is no longer excluded");
    } else {
        println!("Rule {rule_identifier} was not excluded");
    }
    Ok(())
}

pub fn list_rules(config_manager: &ConfigManager) -> Result<()> {
    let store = open_store(config_manager);
    println!("{}", ConsoleReporter::new().render_rules(&store.excluded_rules()));
    Ok(())
}

pub fn clear_rules(config_manager: &ConfigManager) -> Result<()> {
    let store = open_store(config_manager);
    store.set_excluded_rules(Vec::new());
    println!("✓ Removed all rule exclusions");
    Ok(())
}

pub fn exclude_file(config_manager: &ConfigManager, pattern: String, directory: bool) -> Result<()> {
    let exclusion = if directory {
        FileExclusion::directory(pattern)
    } else {
        FileExclusion::file(pattern)
    };
    refuse_on_issues(StandardValidator::new().validate_file_exclusion(&exclusion))?;

    let store = open_store(config_manager);
    if store.exclude_file(exclusion.clone()) {
        println!("✓ Excluded {exclusion}");
    } else {
        println!("{exclusion} is already excluded");
    }
    Ok(())
}

pub fn list_files(config_manager: &ConfigManager) -> Result<()> {
    let store = open_store(config_manager);
    println!("{}", ConsoleReporter::new().render_files(&store.global_file_exclusions()));
    Ok(())
}

/// Adds or replaces a global `name=value` property.
pub fn set_property(config_manager: &ConfigManager, pair: &str) -> Result<()> {
    let property = ExtraProperty::parse(pair)
        .with_context(|| format!("Invalid property '{pair}', expected 'name=value'"))?;
    refuse_on_issues(StandardValidator::new().validate_property(&property))?;

    let store = open_store(config_manager);
    if store.set_property(property.clone()) {
        println!("✓ Set {property}");
    } else {
        println!("{property} is already set");
    }
    Ok(())
}

pub fn remove_property(config_manager: &ConfigManager, name: &str) -> Result<()> {
    let store = open_store(config_manager);
    if store.remove_property(name) {
        println!("✓ Removed property {name}");
    } else {
        println!("Property {name} is not set");
    }
    Ok(())
}

/// Lists the properties an analysis would receive: global ones, then the
/// project's when a project file is configured.
pub fn list_properties(config_manager: &ConfigManager) -> Result<()> {
    let store = open_store(config_manager);
    let project = config_manager.open_project();
    let properties = store.extra_properties_for_analysis(
        project.as_ref().map(|p| p as &dyn PreferenceStore),
    );
    println!("{}", ConsoleReporter::new().render_properties(&properties));
    Ok(())
}

/// Shows or changes the marker severity.
pub fn severity(config_manager: &ConfigManager, level: Option<&str>) -> Result<()> {
    let store = open_store(config_manager);
    match level {
        Some(level) => {
            let severity: MarkerSeverity = level.parse()?;
            store.set_marker_severity(severity);
            println!("✓ Marker severity set to {severity}");
        }
        None => println!("Marker severity: {}", store.marker_severity()),
    }
    Ok(())
}

/// Reports whether `path` is excluded and whether it counts as a test file.
pub fn check_path(config_manager: &ConfigManager, path: &str) -> Result<()> {
    let store = open_store(config_manager);
    let excluded = store.is_file_excluded(path);
    let test_file = store.is_test_file(path);

    println!(
        "{path}: {}{}",
        if excluded { "excluded" } else { "analyzed" },
        if test_file { " (test file)" } else { "" }
    );
    Ok(())
}

pub fn validate_preferences(config_manager: &ConfigManager) -> Result<()> {
    let store = open_store(config_manager);
    let rules: Vec<RuleExclusion> = store.excluded_rules().into_iter().collect();
    let files = store.global_file_exclusions();
    let properties = store.extra_properties();

    let mut issues = StandardValidator::new().validate_preferences(&rules, &files, &properties);
    let test_globs = store.test_file_globs();
    let (_, glob_errors) = crate::builders::patterns::parse_glob_list(&test_globs);
    issues.extend(glob_errors.into_iter().map(|e| format!("{e:#}")));

    if issues.is_empty() {
        println!("✓ Preferences are valid.");
        Ok(())
    } else {
        println!("⚠️  Found issues in preferences:");
        for issue in issues {
            println!("  - {issue}");
        }
        anyhow::bail!("Preference validation failed.");
    }
}

pub fn export_preferences(config_manager: &ConfigManager, output: &Path, format: &str) -> Result<()> {
    let store = open_store(config_manager);
    config_manager.export_preferences(&store, output, format)?;
    println!("✓ Exported preferences to {}", output.display());
    Ok(())
}

fn open_store(config_manager: &ConfigManager) -> ExclusionStore<FilePreferences> {
    config_manager.open_store(Arc::new(LoggingTrigger))
}

fn refuse_on_issues(issues: Vec<String>) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    anyhow::bail!("{}", issues.join("; "))
}
