use serde::{Deserialize, Serialize};
use std::fmt;

/// An extra `name=value` property handed to the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraProperty {
    pub name: String,
    pub value: String,
}

impl ExtraProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `name=value` on the first `=`, so values may contain `=`.
    pub fn parse(pair: &str) -> Option<Self> {
        let (name, value) = pair.split_once('=')?;
        Some(Self::new(name, value))
    }
}

impl fmt::Display for ExtraProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Severity used for issue markers. The numeric values are the ones persisted
/// under `markerSeverity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerSeverity {
    #[default]
    Info,
    Warning,
    Error,
}

impl MarkerSeverity {
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(MarkerSeverity::Info),
            1 => Some(MarkerSeverity::Warning),
            2 => Some(MarkerSeverity::Error),
            _ => None,
        }
    }

    pub fn level(self) -> i32 {
        match self {
            MarkerSeverity::Info => 0,
            MarkerSeverity::Warning => 1,
            MarkerSeverity::Error => 2,
        }
    }
}

impl fmt::Display for MarkerSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerSeverity::Info => write!(f, "info"),
            MarkerSeverity::Warning => write!(f, "warning"),
            MarkerSeverity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for MarkerSeverity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(MarkerSeverity::Info),
            "warning" => Ok(MarkerSeverity::Warning),
            "error" => Ok(MarkerSeverity::Error),
            _ => anyhow::bail!("Invalid marker severity: {s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_parse_splits_on_first_equals() {
        let prop = ExtraProperty::parse("sonar.java.source=1.8").unwrap();
        assert_eq!(prop.name, "sonar.java.source");
        assert_eq!(prop.value, "1.8");

        let prop = ExtraProperty::parse("jvm.args=-Da=b").unwrap();
        assert_eq!(prop.value, "-Da=b");

        assert_eq!(ExtraProperty::parse("no separator"), None);
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(MarkerSeverity::default(), MarkerSeverity::Info);
        for severity in [MarkerSeverity::Info, MarkerSeverity::Warning, MarkerSeverity::Error] {
            assert_eq!(MarkerSeverity::from_level(severity.level()), Some(severity));
        }
        assert_eq!(MarkerSeverity::from_level(7), None);
        assert_eq!("Warning".parse::<MarkerSeverity>().unwrap(), MarkerSeverity::Warning);
    }
}
