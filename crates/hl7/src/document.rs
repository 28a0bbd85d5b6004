//! JSON object form of a message.
//!
//! Callers may post a message as a structured object instead of raw text:
//!
//! ```json
//! {
//!   "messageHeader": { "messageType": "ADT^A01", "version": "2.5", "timestamp": "..." },
//!   "segments": [
//!     { "segmentType": "MSH", "fields": ["^~\\&", "App", "Fac"] },
//!     { "segmentType": "PID", "fields": ["1", "", "123456"] }
//!   ]
//! }
//! ```
//!
//! Each segment is reassembled as `segmentType|field1|field2...` and the lines are joined with
//! `\n`, so the object form goes through exactly the same validation and mapping as raw text.

use crate::constants::FIELD_SEPARATOR;
use crate::{Hl7Error, Hl7Result};
use serde::Deserialize;

/// Structured message as posted by callers.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct MessageDocument {
    #[serde(default)]
    pub message_header: Option<MessageHeader>,
    pub segments: Vec<SegmentDocument>,
}

/// Informational header; it does not participate in reassembly.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SegmentDocument {
    pub segment_type: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl MessageDocument {
    /// Decode the object form, reporting the JSON path of the first mismatch.
    pub fn from_value(value: &serde_json::Value) -> Hl7Result<Self> {
        serde_path_to_error::deserialize::<_, MessageDocument>(value).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            Hl7Error::InvalidObject(format!("schema mismatch at {path}: {source}"))
        })
    }

    /// Reassemble raw pipe-delimited text.
    pub fn to_raw(&self) -> String {
        self.segments
            .iter()
            .map(|segment| {
                std::iter::once(segment.segment_type.as_str())
                    .chain(segment.fields.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(&FIELD_SEPARATOR.to_string())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use serde_json::json;

    #[test]
    fn reassembles_segments_into_raw_text() {
        let value = json!({
            "messageHeader": { "messageType": "ADT^A01", "version": "2.5" },
            "segments": [
                { "segmentType": "MSH", "fields": ["^~\\&", "App", "Fac", "RApp", "RFac"] },
                { "segmentType": "PID", "fields": ["1", "", "123456", "", "Doe^John"] }
            ]
        });

        let document = MessageDocument::from_value(&value).expect("valid document");
        assert_eq!(
            document.to_raw(),
            "MSH|^~\\&|App|Fac|RApp|RFac\nPID|1||123456||Doe^John"
        );

        let message = Message::parse(&document.to_raw());
        let pid = message.segment("PID").expect("pid");
        assert_eq!(pid.leading_component(3), Some("123456"));
    }

    #[test]
    fn header_is_optional() {
        let value = json!({ "segments": [{ "segmentType": "MSH" }] });
        let document = MessageDocument::from_value(&value).expect("valid document");
        assert!(document.message_header.is_none());
        assert_eq!(document.to_raw(), "MSH");
    }

    #[test]
    fn reports_path_of_wrong_type() {
        let value = json!({
            "segments": [{ "segmentType": "PID", "fields": "not-an-array" }]
        });
        let err = MessageDocument::from_value(&value).expect_err("should reject");
        match err {
            Hl7Error::InvalidObject(msg) => assert!(msg.contains("segments[0].fields"), "{msg}"),
            other => panic!("expected InvalidObject, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_segments() {
        let err = MessageDocument::from_value(&json!({ "foo": 1 })).expect_err("should reject");
        assert!(matches!(err, Hl7Error::InvalidObject(_)));
    }
}
