use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;

/// Default value of the `testFileRegexps` preference.
pub const DEFAULT_TEST_FILE_PATTERNS: &str = "**/*Test.*,**/test/**/*";

/// A compiled path glob, used to recognise test files.
///
/// Supported syntax:
/// - `**/` matches zero or more leading directories.
/// - `**` matches anything, separators included.
/// - `*` matches anything except `/`.
/// - `?` matches a single character except `/`.
///
/// Every other character is matched literally.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    /// The glob as the user wrote it.
    pub glob: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compiles a glob into an anchored regular expression.
    ///
    /// # Arguments
    /// * `glob`: The glob string, e.g. `**/test/**/*`.
    ///
    /// # Returns
    /// The compiled pattern, or an error if the generated regex is rejected.
    pub fn new(glob: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(glob))
            .with_context(|| format!("Invalid glob pattern: {glob}"))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// Checks a project-relative path against the glob. Backslashes are
    /// treated as `/`.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(&path.replace('\\', "/"))
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glob)
    }
}

/// Parses a comma separated list of globs, as stored under `testFileRegexps`.
///
/// Blank entries are ignored. Entries that fail to compile are returned in
/// the error list rather than aborting the whole list.
pub fn parse_glob_list(list: &str) -> (Vec<GlobPattern>, Vec<anyhow::Error>) {
    let mut patterns = Vec::new();
    let mut errors = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match GlobPattern::new(entry) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => errors.push(e),
        }
    }

    (patterns, errors)
}

fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::from("^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    regex.push_str("(?:.*/)?");
                } else {
                    regex.push_str(".*");
                }
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }

    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_translation() {
        assert_eq!(glob_to_regex("*.java"), r"^[^/]*\.java$");
        assert_eq!(glob_to_regex("**/test/**/*"), "^(?:.*/)?test/(?:.*/)?[^/]*$");
        assert_eq!(glob_to_regex("src/**"), "^src/.*$");
    }

    #[test]
    fn test_default_patterns_match_tests() {
        let (patterns, errors) = parse_glob_list(DEFAULT_TEST_FILE_PATTERNS);
        assert!(errors.is_empty());
        assert_eq!(patterns.len(), 2);

        let is_test = |path: &str| patterns.iter().any(|p| p.matches(path));
        assert!(is_test("FooTest.java"));
        assert!(is_test("src/main/FooTest.java"));
        assert!(is_test("src/test/java/org/Foo.java"));
        assert!(is_test("test/foo.js"));
        assert!(is_test("src\\test\\Foo.java"));
        assert!(!is_test("src/main/java/Foo.java"));
        assert!(!is_test("src/main/Testing.java"));
    }

    #[test]
    fn test_single_character_wildcard() {
        let pattern = GlobPattern::new("src/?.rs").unwrap();
        assert!(pattern.matches("src/a.rs"));
        assert!(!pattern.matches("src/ab.rs"));
        assert!(!pattern.matches("src//.rs"));
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let (patterns, errors) = parse_glob_list(" , **/*Spec.*, ");
        assert!(errors.is_empty());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].to_string(), "**/*Spec.*");
    }
}
