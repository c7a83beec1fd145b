//! Text encodings for preference values.
//!
//! Every preference lives in a flat string-keyed store, so collections are
//! flattened into a single string:
//!
//! | Key              | Format                                          |
//! |------------------|-------------------------------------------------|
//! | `ruleExclusions` | `;`-joined `repository:key:base64(name)`        |
//! | `fileExclusions` | CRLF-joined `TYPE:pattern`                      |
//! | `extraArgs`      | CRLF-joined `name=value`                        |
//!
//! Decoding never fails as a whole. Segments that cannot be parsed are
//! dropped so that values written by older clients still load.

use base64::{Engine as _, engine::general_purpose};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::exclusions::FileExclusion;
use crate::core::properties::ExtraProperty;
use crate::core::rules::{RuleExclusion, RuleIdentifier};

/// Separator between encoded rule exclusions.
pub const RULE_SEPARATOR: &str = ";";
/// Separator between the fields of one encoded rule exclusion.
pub const FIELD_SEPARATOR: char = ':';
/// Line separator for file exclusions and extra properties.
pub const LINE_SEPARATOR: &str = "\r\n";

/// Reasons a single encoded rule exclusion cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("missing ':' after repository in '{0}'")]
    MissingRepositoryDelimiter(String),
    #[error("missing ':' after rule key in '{0}'")]
    MissingKeyDelimiter(String),
    #[error("invalid base64 display name in '{segment}': {reason}")]
    InvalidDisplayName { segment: String, reason: String },
}

/// Encodes one exclusion as `repository:key:base64(display_name)`.
///
/// `:` inside the repository or key is written as is and will not survive a
/// decode. `ExclusionValidator` reports such identifiers before they are stored.
pub fn encode_rule_exclusion(exclusion: &RuleExclusion) -> String {
    let id = &exclusion.rule_identifier;
    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
        id.repository,
        id.key,
        general_purpose::STANDARD.encode(exclusion.display_name.as_bytes())
    )
}

/// Decodes one `repository:key:payload` segment.
///
/// The repository ends at the first `:` and the key at the second; everything
/// after that, further colons included, is the base64 payload.
pub fn decode_rule_exclusion(segment: &str) -> Result<RuleExclusion, CodecError> {
    let end_of_repository = segment
        .find(FIELD_SEPARATOR)
        .ok_or_else(|| CodecError::MissingRepositoryDelimiter(segment.to_string()))?;
    let rest = &segment[end_of_repository + 1..];
    let end_of_key = rest
        .find(FIELD_SEPARATOR)
        .ok_or_else(|| CodecError::MissingKeyDelimiter(segment.to_string()))?;

    let repository = &segment[..end_of_repository];
    let key = &rest[..end_of_key];
    let payload = &rest[end_of_key + 1..];

    let name_bytes = general_purpose::STANDARD.decode(payload).map_err(|e| {
        CodecError::InvalidDisplayName {
            segment: segment.to_string(),
            reason: e.to_string(),
        }
    })?;
    let display_name = String::from_utf8_lossy(&name_bytes).into_owned();

    Ok(RuleExclusion::new(
        RuleIdentifier::new(repository, key),
        display_name,
    ))
}

/// Joins encoded exclusions with `;`.
pub fn encode_rule_exclusions<'a, I>(exclusions: I) -> String
where
    I: IntoIterator<Item = &'a RuleExclusion>,
{
    exclusions
        .into_iter()
        .map(encode_rule_exclusion)
        .collect::<Vec<_>>()
        .join(RULE_SEPARATOR)
}

/// Decodes a `;`-joined list into a set.
///
/// A missing or empty value yields an empty set. Malformed segments are
/// logged and skipped. When two segments name the same rule the first one wins.
pub fn decode_rule_exclusions(raw: Option<&str>) -> BTreeSet<RuleExclusion> {
    let mut exclusions = BTreeSet::new();

    for segment in raw.unwrap_or_default().split(RULE_SEPARATOR) {
        if segment.is_empty() {
            continue;
        }
        match decode_rule_exclusion(segment) {
            Ok(exclusion) => {
                exclusions.insert(exclusion);
            }
            Err(e) => warn!(error = %e, "Dropping malformed rule exclusion"),
        }
    }

    exclusions
}

/// Joins `TYPE:pattern` lines with CRLF, keeping the given order.
pub fn encode_file_exclusions(exclusions: &[FileExclusion]) -> String {
    exclusions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Decodes CRLF-joined `TYPE:pattern` lines, in order. Unparsable lines are
/// filtered out.
pub fn decode_file_exclusions(raw: Option<&str>) -> Vec<FileExclusion> {
    split_lines(raw)
        .filter_map(|line| {
            let parsed = FileExclusion::parse(line);
            if parsed.is_none() {
                debug!(line, "Ignoring unparsable file exclusion");
            }
            parsed
        })
        .collect()
}

/// Joins `name=value` lines with CRLF.
pub fn encode_extra_properties(properties: &[ExtraProperty]) -> String {
    properties
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Decodes CRLF-joined `name=value` lines, in order. Lines without `=` are
/// logged and skipped.
pub fn decode_extra_properties(raw: Option<&str>) -> Vec<ExtraProperty> {
    split_lines(raw)
        .filter_map(|line| match ExtraProperty::parse(line) {
            Some(prop) => Some(prop),
            None => {
                warn!(line, "Dropping extra property without '='");
                None
            }
        })
        .collect()
}

fn split_lines(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(LINE_SEPARATOR)
        .filter(|line| !line.is_empty())
}
