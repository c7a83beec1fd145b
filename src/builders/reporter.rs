use std::collections::BTreeSet;

use crate::core::exclusions::{ExclusionType, FileExclusion};
use crate::core::properties::ExtraProperty;
use crate::core::rules::RuleExclusion;

/// A `StatusReporter` renders configured exclusions for the user.
///
/// Rendering returns the text instead of printing it so callers decide where
/// it goes and tests can inspect it.
pub trait StatusReporter {
    /// Renders the excluded rules, one per line, as `repository:key  display name`.
    fn render_rules(&self, rules: &BTreeSet<RuleExclusion>) -> String;

    /// Renders the file exclusions in their configured order.
    fn render_files(&self, files: &[FileExclusion]) -> String;

    /// Renders extra analyzer properties as `name=value`.
    fn render_properties(&self, properties: &[ExtraProperty]) -> String;
}

/// A concrete implementation of `StatusReporter` for terminal output.
///
/// This is the reporter used by the `list-*` commands.
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Constructs a new `ConsoleReporter` instance.
    pub fn new() -> Self {
        Self
    }

    /// Picks the icon shown in front of a file exclusion.
    fn icon_for(&self, exclusion_type: ExclusionType) -> &'static str {
        match exclusion_type {
            ExclusionType::File => "📄",
            ExclusionType::Directory => "📁",
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for ConsoleReporter {
    fn render_rules(&self, rules: &BTreeSet<RuleExclusion>) -> String {
        if rules.is_empty() {
            return "No rules excluded.".to_string();
        }

        // Pad the rule column so display names line up.
        let width = rules
            .iter()
            .map(|r| r.rule_identifier.to_string().chars().count())
            .max()
            .unwrap_or(0);

        let mut out = format!("🚫 Excluded rules ({}):\n", rules.len());
        for rule in rules {
            let id = rule.rule_identifier.to_string();
            if rule.display_name.is_empty() {
                out.push_str(&format!("  {id}\n"));
            } else {
                out.push_str(&format!("  {id:<width$}  {}\n", rule.display_name));
            }
        }
        out
    }

    fn render_files(&self, files: &[FileExclusion]) -> String {
        if files.is_empty() {
            return "No file exclusions configured.".to_string();
        }

        let mut out = format!("Excluded files ({}):\n", files.len());
        for file in files {
            out.push_str(&format!(
                "  {} {} ({})\n",
                self.icon_for(file.exclusion_type),
                file.pattern,
                file.exclusion_type
            ));
        }
        out
    }

    fn render_properties(&self, properties: &[ExtraProperty]) -> String {
        if properties.is_empty() {
            return "No extra properties configured.".to_string();
        }

        let mut out = String::from("Extra properties:\n");
        for property in properties {
            out.push_str(&format!("  {property}\n"));
        }
        out
    }
}
