use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a file exclusion names a single file or a whole directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExclusionType {
    File,
    Directory,
}

impl fmt::Display for ExclusionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionType::File => write!(f, "FILE"),
            ExclusionType::Directory => write!(f, "DIRECTORY"),
        }
    }
}

impl FromStr for ExclusionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FILE" => Ok(ExclusionType::File),
            "DIRECTORY" => Ok(ExclusionType::Directory),
            _ => anyhow::bail!("Invalid exclusion type: {s}"),
        }
    }
}

/// A path excluded from analysis.
///
/// The textual form is `<TYPE>:<pattern>`, for example `DIRECTORY:target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileExclusion {
    pub pattern: String,
    pub exclusion_type: ExclusionType,
}

impl FileExclusion {
    pub fn new(pattern: impl Into<String>, exclusion_type: ExclusionType) -> Self {
        Self {
            pattern: pattern.into(),
            exclusion_type,
        }
    }

    pub fn file(pattern: impl Into<String>) -> Self {
        Self::new(pattern, ExclusionType::File)
    }

    pub fn directory(pattern: impl Into<String>) -> Self {
        Self::new(pattern, ExclusionType::Directory)
    }

    /// Parses `<TYPE>:<pattern>`, splitting on the first `:` so patterns may
    /// themselves contain colons. Returns `None` for anything unparsable.
    pub fn parse(line: &str) -> Option<Self> {
        let (kind, pattern) = line.split_once(':')?;
        let exclusion_type = kind.parse().ok()?;
        if pattern.is_empty() {
            return None;
        }
        Some(Self::new(pattern, exclusion_type))
    }

    /// Checks whether a project-relative path falls under this exclusion.
    ///
    /// A `File` exclusion matches its exact path only. A `Directory` exclusion
    /// matches the directory and every path beneath it. Backslashes are
    /// treated as separators on both sides.
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        let pattern = normalize(&self.pattern);
        let pattern = pattern.trim_end_matches('/');

        match self.exclusion_type {
            ExclusionType::File => path == pattern,
            ExclusionType::Directory => {
                path == pattern
                    || path
                        .strip_prefix(pattern)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

impl fmt::Display for FileExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exclusion_type, self.pattern)
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}
