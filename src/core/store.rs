use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::builders::codec;
use crate::builders::patterns::{self, GlobPattern};
use crate::builders::storage::PreferenceStore;
use crate::core::exclusions::FileExclusion;
use crate::core::properties::{ExtraProperty, MarkerSeverity};
use crate::core::rules::{RuleExclusion, RuleIdentifier};
use crate::core::trigger::AnalysisTrigger;

pub const PREF_RULE_EXCLUSIONS: &str = "ruleExclusions";
pub const PREF_FILE_EXCLUSIONS: &str = "fileExclusions";
pub const PREF_EXTRA_ARGS: &str = "extraArgs";
pub const PREF_MARKER_SEVERITY: &str = "markerSeverity";
pub const PREF_TEST_FILE_REGEXPS: &str = "testFileRegexps";

/// Reads and writes exclusion preferences through an injected `PreferenceStore`.
///
/// Every write is flushed immediately. A failed flush is logged and otherwise
/// ignored, leaving the in-memory value changed while the persisted one is
/// stale. Read-modify-write operations hold the store lock for the whole
/// cycle, so concurrent callers cannot drop each other's updates.
pub struct ExclusionStore<P: PreferenceStore> {
    preferences: Mutex<P>,
    trigger: Option<Arc<dyn AnalysisTrigger>>,
}

impl<P: PreferenceStore> ExclusionStore<P> {
    pub fn new(preferences: P) -> Self {
        Self {
            preferences: Mutex::new(preferences),
            trigger: None,
        }
    }

    /// Installs the collaborator notified after rule or file exclusions change.
    pub fn with_trigger(mut self, trigger: Arc<dyn AnalysisTrigger>) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Gives the underlying preferences back, e.g. to inspect the raw values.
    pub fn into_inner(self) -> P {
        self.preferences.into_inner()
    }

    /// Returns the raw persisted string for `key`, if any.
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.preferences.lock().get(key)
    }

    pub fn excluded_rules(&self) -> BTreeSet<RuleExclusion> {
        let prefs = self.preferences.lock();
        codec::decode_rule_exclusions(prefs.get(PREF_RULE_EXCLUSIONS).as_deref())
    }

    pub fn excluded_rule_keys(&self) -> BTreeSet<RuleIdentifier> {
        self.excluded_rules()
            .into_iter()
            .map(|e| e.rule_identifier)
            .collect()
    }

    pub fn is_rule_excluded(&self, rule: &RuleIdentifier) -> bool {
        self.excluded_rules()
            .iter()
            .any(|e| &e.rule_identifier == rule)
    }

    /// Replaces the whole set of excluded rules. Duplicate identifiers in
    /// `rules` collapse to the first occurrence.
    pub fn set_excluded_rules<I>(&self, rules: I)
    where
        I: IntoIterator<Item = RuleExclusion>,
    {
        let rules: BTreeSet<RuleExclusion> = rules.into_iter().collect();
        {
            let mut prefs = self.preferences.lock();
            persist(&mut *prefs, PREF_RULE_EXCLUSIONS, codec::encode_rule_exclusions(&rules));
        }
        debug!(count = rules.len(), "Replaced excluded rules");
        self.notify();
    }

    /// Adds `exclusion` to the excluded rules.
    ///
    /// Returns `false` when the rule was already excluded, in which case the
    /// stored display name is kept and nothing is written.
    pub fn exclude_rule(&self, exclusion: RuleExclusion) -> bool {
        let inserted = {
            let mut prefs = self.preferences.lock();
            let mut rules =
                codec::decode_rule_exclusions(prefs.get(PREF_RULE_EXCLUSIONS).as_deref());
            let rule = exclusion.rule_identifier.clone();
            if !rules.insert(exclusion) {
                debug!(%rule, "Rule already excluded");
                false
            } else {
                persist(&mut *prefs, PREF_RULE_EXCLUSIONS, codec::encode_rule_exclusions(&rules));
                debug!(%rule, "Excluded rule");
                true
            }
        };

        if inserted {
            self.notify();
        }
        inserted
    }

    /// Removes the exclusion for `rule`. Returns whether one existed.
    pub fn include_rule(&self, rule: &RuleIdentifier) -> bool {
        let removed = {
            let mut prefs = self.preferences.lock();
            let mut rules =
                codec::decode_rule_exclusions(prefs.get(PREF_RULE_EXCLUSIONS).as_deref());
            let before = rules.len();
            rules.retain(|e| &e.rule_identifier != rule);
            if rules.len() == before {
                false
            } else {
                persist(&mut *prefs, PREF_RULE_EXCLUSIONS, codec::encode_rule_exclusions(&rules));
                true
            }
        };

        if removed {
            debug!(%rule, "Rule included again");
            self.notify();
        }
        removed
    }

    pub fn global_file_exclusions(&self) -> Vec<FileExclusion> {
        let prefs = self.preferences.lock();
        codec::decode_file_exclusions(prefs.get(PREF_FILE_EXCLUSIONS).as_deref())
    }

    pub fn set_global_file_exclusions(&self, exclusions: &[FileExclusion]) {
        {
            let mut prefs = self.preferences.lock();
            persist(&mut *prefs, PREF_FILE_EXCLUSIONS, codec::encode_file_exclusions(exclusions));
        }
        self.notify();
    }

    /// Appends `exclusion` unless an identical one is already configured.
    pub fn exclude_file(&self, exclusion: FileExclusion) -> bool {
        let added = {
            let mut prefs = self.preferences.lock();
            let mut exclusions =
                codec::decode_file_exclusions(prefs.get(PREF_FILE_EXCLUSIONS).as_deref());
            if exclusions.contains(&exclusion) {
                false
            } else {
                exclusions.push(exclusion);
                persist(&mut *prefs, PREF_FILE_EXCLUSIONS, codec::encode_file_exclusions(&exclusions));
                true
            }
        };

        if added {
            self.notify();
        }
        added
    }

    /// Checks a project-relative path against the global file exclusions.
    pub fn is_file_excluded(&self, path: &str) -> bool {
        self.global_file_exclusions()
            .iter()
            .any(|e| e.matches(path))
    }

    pub fn extra_properties(&self) -> Vec<ExtraProperty> {
        let prefs = self.preferences.lock();
        codec::decode_extra_properties(prefs.get(PREF_EXTRA_ARGS).as_deref())
    }

    pub fn set_extra_properties(&self, properties: &[ExtraProperty]) {
        let mut prefs = self.preferences.lock();
        persist(&mut *prefs, PREF_EXTRA_ARGS, codec::encode_extra_properties(properties));
    }

    /// Adds `property`, or replaces the value of the property with the same
    /// name. Returns `false` when an identical property was already set.
    pub fn set_property(&self, property: ExtraProperty) -> bool {
        let mut prefs = self.preferences.lock();
        let mut properties = codec::decode_extra_properties(prefs.get(PREF_EXTRA_ARGS).as_deref());
        match properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) if existing.value == property.value => return false,
            Some(existing) => existing.value = property.value,
            None => properties.push(property),
        }
        persist(&mut *prefs, PREF_EXTRA_ARGS, codec::encode_extra_properties(&properties));
        true
    }

    /// Removes every property called `name`. Returns whether one was set.
    pub fn remove_property(&self, name: &str) -> bool {
        let mut prefs = self.preferences.lock();
        let mut properties = codec::decode_extra_properties(prefs.get(PREF_EXTRA_ARGS).as_deref());
        let before = properties.len();
        properties.retain(|p| p.name != name);
        if properties.len() == before {
            return false;
        }
        persist(&mut *prefs, PREF_EXTRA_ARGS, codec::encode_extra_properties(&properties));
        debug!(name, "Removed extra property");
        true
    }

    /// Properties passed to a local analysis: the global ones first, then
    /// those configured on the project, if any.
    pub fn extra_properties_for_analysis(
        &self,
        project: Option<&dyn PreferenceStore>,
    ) -> Vec<ExtraProperty> {
        let mut properties = self.extra_properties();
        if let Some(project) = project {
            properties.extend(codec::decode_extra_properties(
                project.get(PREF_EXTRA_ARGS).as_deref(),
            ));
        }
        properties
    }

    pub fn marker_severity(&self) -> MarkerSeverity {
        let Some(raw) = self.preferences.lock().get(PREF_MARKER_SEVERITY) else {
            return MarkerSeverity::default();
        };

        match raw.trim().parse::<i32>().ok().and_then(MarkerSeverity::from_level) {
            Some(severity) => severity,
            None => {
                warn!(value = %raw, "Invalid marker severity, using default");
                MarkerSeverity::default()
            }
        }
    }

    pub fn set_marker_severity(&self, severity: MarkerSeverity) {
        let mut prefs = self.preferences.lock();
        persist(&mut *prefs, PREF_MARKER_SEVERITY, severity.level().to_string());
    }

    /// The raw comma separated test file globs, or the default list.
    pub fn test_file_globs(&self) -> String {
        self.preferences
            .lock()
            .get_or(PREF_TEST_FILE_REGEXPS, patterns::DEFAULT_TEST_FILE_PATTERNS)
    }

    pub fn set_test_file_globs(&self, globs: &str) {
        let mut prefs = self.preferences.lock();
        persist(&mut *prefs, PREF_TEST_FILE_REGEXPS, globs.to_string());
    }

    /// Compiled test file globs. Entries that do not compile are logged and skipped.
    pub fn test_file_patterns(&self) -> Vec<GlobPattern> {
        let (compiled, errors) = patterns::parse_glob_list(&self.test_file_globs());
        for e in errors {
            warn!(error = %format!("{e:#}"), "Skipping test file pattern");
        }
        compiled
    }

    /// Checks a single path. The globs are compiled on every call; use
    /// [`Self::test_files`] or hold on to [`Self::test_file_patterns`] when
    /// checking many paths.
    pub fn is_test_file(&self, path: &str) -> bool {
        self.test_file_patterns().iter().any(|p| p.matches(path))
    }

    /// Returns the paths among `paths` that are test files, compiling the
    /// globs once.
    pub fn test_files<'a>(&self, paths: &[&'a str]) -> Vec<&'a str> {
        let patterns = self.test_file_patterns();
        paths
            .iter()
            .copied()
            .filter(|path| patterns.iter().any(|p| p.matches(path)))
            .collect()
    }

    fn notify(&self) {
        if let Some(trigger) = &self.trigger {
            trigger.notify_exclusions_changed();
        }
    }
}

fn persist(prefs: &mut dyn PreferenceStore, key: &str, value: String) {
    prefs.set(key, value.clone());
    if let Err(e) = prefs.flush() {
        error!(key, value = %value, error = %format!("{e:#}"), "Could not save preference");
    }
}
