use std::collections::HashSet;

use crate::builders::codec::{FIELD_SEPARATOR, LINE_SEPARATOR, RULE_SEPARATOR};
use crate::core::exclusions::FileExclusion;
use crate::core::properties::ExtraProperty;
use crate::core::rules::RuleExclusion;

/// The `ExclusionValidator` trait defines checks run on preference values
/// before they are written.
///
/// The preference codec does not escape its separators, so a value that
/// contains one is stored but comes back differently (or not at all) on the
/// next read. Validators report those values so callers can refuse or warn.
pub trait ExclusionValidator {
    /// Validates a single rule exclusion.
    ///
    /// # Returns
    /// A list of human-readable issues; empty when the exclusion is safe to store.
    fn validate_rule_exclusion(&self, exclusion: &RuleExclusion) -> Vec<String>;

    /// Validates a single file exclusion.
    fn validate_file_exclusion(&self, exclusion: &FileExclusion) -> Vec<String>;

    /// Validates a single extra analyzer property.
    fn validate_property(&self, property: &ExtraProperty) -> Vec<String>;

    /// Validates everything currently configured and returns all issues found.
    ///
    /// On top of the per-item checks this reports repeated file exclusions and
    /// extra properties defined more than once.
    fn validate_preferences(
        &self,
        rules: &[RuleExclusion],
        files: &[FileExclusion],
        properties: &[ExtraProperty],
    ) -> Vec<String>;
}

/// The `StandardValidator` checks every value against the separators used by
/// the preference codec.
pub struct StandardValidator;

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self
    }

    /// Reports duplicated entries in a list, using `key` to identify them.
    ///
    /// # Arguments
    /// * `items`: The list to scan.
    /// * `key`: Extracts the identity of an item.
    /// * `describe`: Builds the warning text for a repeated identity.
    fn check_duplicates<T, K, F, D>(&self, items: &[T], key: F, describe: D) -> Vec<String>
    where
        K: Eq + std::hash::Hash,
        F: Fn(&T) -> K,
        D: Fn(&T) -> String,
    {
        let mut seen = HashSet::new();
        items
            .iter()
            .filter(|item| !seen.insert(key(item)))
            .map(describe)
            .collect()
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionValidator for StandardValidator {
    fn validate_rule_exclusion(&self, exclusion: &RuleExclusion) -> Vec<String> {
        let mut issues = Vec::new();
        let id = &exclusion.rule_identifier;

        if id.repository.is_empty() {
            issues.push(format!("Rule '{id}' has an empty repository"));
        }
        if id.key.is_empty() {
            issues.push(format!("Rule '{id}' has an empty key"));
        }
        // The repository ends at the first ':' on decode, so any colon in
        // either field shifts the split.
        if id.repository.contains(FIELD_SEPARATOR) || id.key.contains(FIELD_SEPARATOR) {
            issues.push(format!(
                "Rule '{id}' contains '{FIELD_SEPARATOR}' in its repository or key and cannot be stored"
            ));
        }
        if id.repository.contains(RULE_SEPARATOR) || id.key.contains(RULE_SEPARATOR) {
            issues.push(format!(
                "Rule '{id}' contains '{RULE_SEPARATOR}' and would be split into separate entries"
            ));
        }

        issues
    }

    fn validate_file_exclusion(&self, exclusion: &FileExclusion) -> Vec<String> {
        let mut issues = Vec::new();

        if exclusion.pattern.trim().is_empty() {
            issues.push("File exclusion pattern cannot be empty".to_string());
        }
        if exclusion.pattern.contains(LINE_SEPARATOR) {
            issues.push(format!(
                "File exclusion '{}' contains a line break and would be split",
                exclusion.pattern.escape_debug()
            ));
        }

        issues
    }

    fn validate_property(&self, property: &ExtraProperty) -> Vec<String> {
        let mut issues = Vec::new();

        if property.name.is_empty() {
            issues.push(format!("Property '{property}' has an empty name"));
        }
        if property.name.contains('=') {
            issues.push(format!(
                "Property name '{}' contains '=' and would be read back differently",
                property.name
            ));
        }
        if property.name.contains(LINE_SEPARATOR) || property.value.contains(LINE_SEPARATOR) {
            issues.push(format!(
                "Property '{}' contains a line break and would be split",
                property.name.escape_debug()
            ));
        }

        issues
    }

    fn validate_preferences(
        &self,
        rules: &[RuleExclusion],
        files: &[FileExclusion],
        properties: &[ExtraProperty],
    ) -> Vec<String> {
        let mut issues = Vec::new();

        for rule in rules {
            issues.extend(self.validate_rule_exclusion(rule));
        }
        for file in files {
            issues.extend(self.validate_file_exclusion(file));
        }
        for property in properties {
            issues.extend(self.validate_property(property));
        }

        issues.extend(self.check_duplicates(
            files,
            |f| f.clone(),
            |f| format!("Duplicate file exclusion {f}"),
        ));
        issues.extend(self.check_duplicates(
            properties,
            |p| p.name.clone(),
            |p| format!("Property '{}' is defined more than once", p.name),
        ));

        issues
    }
}
