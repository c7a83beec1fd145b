// This file is the module declaration file for the `core` module.
// It declares the submodules contained within `src/core/` and exposes them
// to the rest of the crate.

// `rules` module:
// Defines `RuleIdentifier` and `RuleExclusion`, the value objects for rules a
// user switched off. Exclusion identity is the rule identifier alone.
pub mod rules;

// `exclusions` module:
// Defines `FileExclusion` and its `ExclusionType`, including how an exclusion
// is matched against a project-relative path.
pub mod exclusions;

// `properties` module:
// Small preference values that are not exclusions: extra analyzer
// properties (`name=value`) and the marker severity.
pub mod properties;

// `store` module:
// `ExclusionStore` reads and writes every preference through an injected
// `PreferenceStore`, holding a lock across read-modify-write cycles and
// notifying the `AnalysisTrigger` after exclusions change.
pub mod store;

// `trigger` module:
// The `AnalysisTrigger` collaborator interface and the logging
// implementation used by the command-line tool.
pub mod trigger;

// `config` module:
// Resolves where the preference files live (`ConfigManager`), creates them,
// and exports a snapshot of all preferences as JSON, YAML or TOML.
pub mod config;
