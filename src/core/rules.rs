use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Names a single analyzer rule: the repository (rule set) it belongs to and
/// its key inside that repository.
///
/// The canonical textual form is `repository:key`, e.g. `squid:S1135`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleIdentifier {
    pub repository: String,
    pub key: String,
}

impl RuleIdentifier {
    pub fn new(repository: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for RuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.key)
    }
}

/// Parses `repository:key`, splitting on the first `:`.
impl FromStr for RuleIdentifier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((repository, key)) if !repository.is_empty() && !key.is_empty() => {
                Ok(Self::new(repository, key))
            }
            _ => anyhow::bail!("Invalid rule identifier '{s}', expected 'repository:key'"),
        }
    }
}

/// A rule the user switched off, together with the name shown for it in listings.
///
/// Identity is the `rule_identifier` alone. Two exclusions that differ only in
/// `display_name` compare equal, so a set of exclusions holds at most one
/// entry per rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExclusion {
    pub rule_identifier: RuleIdentifier,
    pub display_name: String,
}

impl RuleExclusion {
    pub fn new(rule_identifier: RuleIdentifier, display_name: impl Into<String>) -> Self {
        Self {
            rule_identifier,
            display_name: display_name.into(),
        }
    }
}

impl PartialEq for RuleExclusion {
    fn eq(&self, other: &Self) -> bool {
        self.rule_identifier == other.rule_identifier
    }
}

impl Eq for RuleExclusion {}

impl Hash for RuleExclusion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule_identifier.hash(state);
    }
}

impl PartialOrd for RuleExclusion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RuleExclusion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rule_identifier.cmp(&other.rule_identifier)
    }
}
