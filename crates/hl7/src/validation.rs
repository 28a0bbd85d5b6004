//! Structural validation of raw messages.
//!
//! Validation is non-fatal: every defect found is collected and returned together, so a caller
//! sees the complete list in one round trip. An empty list means the message may be mapped.

use crate::constants::{ENCODING_CHARACTERS, FIELD_SEPARATOR, MSH, SEGMENT_ID_LEN};
use serde::{Deserialize, Serialize};

/// Minimum number of `|`-delimited parts in a header segment.
const MIN_HEADER_FIELDS: usize = 5;

/// Position of the message-type field (MSH-9) after splitting on `|`.
const MESSAGE_TYPE_INDEX: usize = 8;

/// A single structural defect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate the gross structure of a raw message.
///
/// Checks, in order:
/// - the message is not blank (if it is, this is the only issue reported),
/// - the first segment is `MSH`,
/// - the header has enough fields, canonical encoding characters and a message type,
/// - every segment has a well-formed id and, outside `MSH`, a field separator after it.
pub fn validate(raw: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        issues.push(ValidationIssue::new("message", "Message cannot be empty"));
        return issues;
    }

    let segments: Vec<&str> = trimmed.lines().collect();
    let Some(first) = segments.first() else {
        issues.push(ValidationIssue::new("segments", "No segments found"));
        return issues;
    };

    if !first.starts_with(MSH) {
        issues.push(ValidationIssue::new(MSH, "First segment must be MSH"));
    }

    validate_header(first, &mut issues);

    for (index, segment) in segments.iter().enumerate() {
        validate_segment(segment, index, &mut issues);
    }

    issues
}

fn validate_header(header: &str, issues: &mut Vec<ValidationIssue>) {
    let fields: Vec<&str> = header.split(FIELD_SEPARATOR).collect();

    if fields.len() < MIN_HEADER_FIELDS {
        issues.push(ValidationIssue::new(
            MSH,
            format!(
                "MSH segment too short: {} fields, expected at least {MIN_HEADER_FIELDS}",
                fields.len()
            ),
        ));
        return;
    }

    if fields[1] != ENCODING_CHARACTERS {
        issues.push(ValidationIssue::new(
            "MSH.1",
            format!(
                "Invalid encoding characters: {}, expected {ENCODING_CHARACTERS}",
                fields[1]
            ),
        ));
    }

    if fields
        .get(MESSAGE_TYPE_INDEX)
        .is_some_and(|message_type| message_type.trim().is_empty())
    {
        issues.push(ValidationIssue::new("MSH.9", "Message type is required"));
    }
}

fn validate_segment(segment: &str, index: usize, issues: &mut Vec<ValidationIssue>) {
    let location = format!("segment[{index}]");

    let id: String = segment.chars().take(SEGMENT_ID_LEN).collect();
    if id.chars().count() < SEGMENT_ID_LEN {
        issues.push(ValidationIssue::new(
            location,
            format!("Segment too short: {segment}"),
        ));
        return;
    }

    let id_ok = id
        .bytes()
        .all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9'));
    if !id_ok {
        issues.push(ValidationIssue::new(
            location.clone(),
            format!("Invalid segment ID: {id}"),
        ));
    }

    if id != MSH && segment.chars().nth(SEGMENT_ID_LEN) != Some(FIELD_SEPARATOR) {
        issues.push(ValidationIssue::new(
            location,
            format!("Missing field separator after {id}"),
        ));
    }
}
