use lint_exclusions::builders::codec;
use lint_exclusions::builders::storage::{FilePreferences, MemoryPreferences, PreferenceStore};
use lint_exclusions::core::config::ConfigManager;
use lint_exclusions::core::exclusions::FileExclusion;
use lint_exclusions::core::properties::ExtraProperty;
use lint_exclusions::core::rules::{RuleExclusion, RuleIdentifier};
use lint_exclusions::core::store::{ExclusionStore, PREF_EXTRA_ARGS, PREF_RULE_EXCLUSIONS};
use lint_exclusions::core::trigger::AnalysisTrigger;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingTrigger {
    notifications: AtomicUsize,
}

impl AnalysisTrigger for RecordingTrigger {
    fn notify_exclusions_changed(&self) {
        self.notifications.fetch_add(1, Ordering::SeqCst);
    }
}

fn setup_prefs() -> (TempDir, ConfigManager) {
    let dir = tempfile::tempdir().unwrap();
    let config_manager = ConfigManager::new_at(dir.path().join("preferences.json"));
    config_manager.initialize().unwrap();
    (dir, config_manager)
}

#[test]
fn test_core_workflow() {
    let (_dir, config_manager) = setup_prefs();
    let trigger = Arc::new(RecordingTrigger::default());

    // 1. Deactivate a rule the way the issue context menu does
    let store = config_manager.open_store(trigger.clone());
    let rule = RuleIdentifier::new("squid", "S1135");
    assert!(store.exclude_rule(RuleExclusion::new(rule.clone(), "Complete Task")));
    assert_eq!(trigger.notifications.load(Ordering::SeqCst), 1);

    // 2. A fresh store over the same file sees it
    let reopened = config_manager.open_store(trigger.clone());
    assert!(reopened.is_rule_excluded(&rule));
    assert_eq!(
        reopened.raw_value(PREF_RULE_EXCLUSIONS).as_deref(),
        Some("squid:S1135:Q29tcGxldGUgVGFzaw==")
    );

    // 3. Remove it again, as the preference page does
    let mut remaining: BTreeSet<RuleExclusion> = reopened.excluded_rules();
    remaining.retain(|e| e.rule_identifier != rule);
    reopened.set_excluded_rules(remaining);
    assert_eq!(trigger.notifications.load(Ordering::SeqCst), 2);

    let last = config_manager.open_store(trigger);
    assert!(last.excluded_rules().is_empty());
}

#[test]
fn test_project_properties_follow_global_ones() {
    let (dir, _config_manager) = setup_prefs();
    let project_path = dir.path().join("project.json");
    let mut project = FilePreferences::open(&project_path);
    project.set(PREF_EXTRA_ARGS, "sonar.sources=src".to_string());
    project.flush().unwrap();

    let config_manager = ConfigManager::new(
        Some(dir.path().join("preferences.json")),
        Some(project_path),
    )
    .unwrap();
    let store = config_manager.open_store(Arc::new(RecordingTrigger::default()));
    store.set_extra_properties(&[ExtraProperty::new("sonar.java.source", "17")]);

    let project = config_manager.open_project().unwrap();
    let props = store.extra_properties_for_analysis(Some(&project as &dyn PreferenceStore));
    let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["sonar.java.source", "sonar.sources"]);
}

#[test]
fn test_round_trip_through_store() {
    let store = ExclusionStore::new(MemoryPreferences::new());
    let rules: BTreeSet<_> = [
        RuleExclusion::new(RuleIdentifier::new("java", "S106"), "Standard outputs"),
        RuleExclusion::new(RuleIdentifier::new("js", "S1481"), "Unused: local variables"),
        RuleExclusion::new(RuleIdentifier::new("py", "S5754"), ""),
    ]
    .into_iter()
    .collect();
    store.set_excluded_rules(rules.clone());

    let loaded = store.excluded_rules();
    assert_eq!(loaded, rules);
    for (a, b) in loaded.iter().zip(rules.iter()) {
        assert_eq!(a.display_name, b.display_name);
    }

    let files = vec![
        FileExclusion::directory("node_modules"),
        FileExclusion::file("src/generated/Parser.java"),
    ];
    store.set_global_file_exclusions(&files);
    assert_eq!(store.global_file_exclusions(), files);

    let raw = store.into_inner();
    assert_eq!(
        codec::decode_rule_exclusions(raw.get(PREF_RULE_EXCLUSIONS).as_deref()),
        rules
    );
}
