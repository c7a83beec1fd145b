use crate::builders::storage::{FilePreferences, PreferenceStore};
use crate::core::config::ConfigManager;
use crate::core::exclusions::FileExclusion;
use crate::core::rules::{RuleExclusion, RuleIdentifier};
use crate::core::store::{ExclusionStore, PREF_FILE_EXCLUSIONS, PREF_RULE_EXCLUSIONS};
use crate::core::trigger::LoggingTrigger;
use crate::utils;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

fn setup_prefs() -> (tempfile::TempDir, PathBuf, ConfigManager) {
    let dir = tempdir().unwrap();
    let prefs_path = dir.path().join("preferences.json");
    let config_manager = ConfigManager::new_at(prefs_path.clone());
    (dir, prefs_path, config_manager)
}

#[test]
fn test_initialization() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    utils::initialize_preferences(&config_manager).unwrap();
    assert!(prefs_path.exists());
}

#[test]
fn test_exclude_rule_command_persists_encoded_value() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    utils::exclude_rule(
        &config_manager,
        "squid:S1135",
        Some("Complete Task".to_string()),
    )
    .unwrap();

    let prefs = FilePreferences::open(&prefs_path);
    assert_eq!(
        prefs.get(PREF_RULE_EXCLUSIONS).as_deref(),
        Some("squid:S1135:Q29tcGxldGUgVGFzaw==")
    );
}

#[test]
fn test_exclude_rule_command_rejects_bad_identifiers() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    assert!(utils::exclude_rule(&config_manager, "no-separator", None).is_err());
    assert!(utils::exclude_rule(&config_manager, "repo:a:b", None).is_err());
    assert!(!prefs_path.exists());
}

#[test]
fn test_file_exclusions_survive_reopen() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    utils::exclude_file(&config_manager, "target".to_string(), true).unwrap();
    utils::exclude_file(&config_manager, "src/Gen.java".to_string(), false).unwrap();

    let raw = fs::read_to_string(&prefs_path).unwrap();
    assert!(raw.contains(PREF_FILE_EXCLUSIONS));

    let store = ExclusionStore::new(FilePreferences::open(&prefs_path));
    assert_eq!(
        store.global_file_exclusions(),
        vec![FileExclusion::directory("target"), FileExclusion::file("src/Gen.java")]
    );
}

#[test]
fn test_preferences_written_by_older_client_still_load() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    // One well-formed entry, one bare rule key left over from an older format.
    fs::write(
        &prefs_path,
        r#"{ "ruleExclusions": "org:S100:bmFtZQ==;S1135", "fileExclusions": "FILE:a.txt\r\nbad" }"#,
    )
    .unwrap();

    let store = config_manager.open_store(Arc::new(LoggingTrigger));
    let rules = store.excluded_rules();
    assert_eq!(rules.len(), 1);
    assert!(rules.contains(&RuleExclusion::new(RuleIdentifier::new("org", "S100"), "name")));
    assert_eq!(store.global_file_exclusions(), vec![FileExclusion::file("a.txt")]);
}

#[test]
fn test_validate_command() {
    let (_dir, _prefs_path, config_manager) = setup_prefs();
    utils::set_property(&config_manager, "sonar.java.source=11").unwrap();
    assert!(utils::validate_preferences(&config_manager).is_ok());

    let mut prefs = FilePreferences::open(config_manager.prefs_path());
    prefs.set("testFileRegexps", "**/*Test.*".to_string());
    prefs.set(PREF_FILE_EXCLUSIONS, "FILE:a\r\nFILE:a".to_string());
    prefs.flush().unwrap();
    assert!(utils::validate_preferences(&config_manager).is_err());
}

#[test]
fn test_property_commands_replace_and_remove() {
    let (_dir, prefs_path, config_manager) = setup_prefs();
    utils::set_property(&config_manager, "sonar.java.source=11").unwrap();
    utils::set_property(&config_manager, "sonar.exclusions=**/gen/**").unwrap();
    utils::set_property(&config_manager, "sonar.java.source=17").unwrap();
    utils::remove_property(&config_manager, "sonar.exclusions").unwrap();
    utils::remove_property(&config_manager, "missing").unwrap();
    assert!(utils::set_property(&config_manager, "no-equals-sign").is_err());

    let prefs = FilePreferences::open(&prefs_path);
    assert_eq!(prefs.get("extraArgs").as_deref(), Some("sonar.java.source=17"));
}
