//! Line-oriented message model.
//!
//! Fields are addressed by their position after splitting the segment on `|`, with the segment
//! id itself at position 0. For every segment other than `MSH` this matches HL7 field numbering
//! (`PID-3` is `field(3)`).

use crate::constants::{COMPONENT_SEPARATOR, FIELD_SEPARATOR, SEGMENT_ID_LEN};
use crate::{Hl7Error, Hl7Result};

/// A parsed message: an ordered list of segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Segment>,
}

/// A single segment line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    id: String,
    fields: Vec<String>,
}

impl Message {
    /// Split raw text on line breaks (`\n` or `\r\n`) into segments.
    ///
    /// Blank lines are dropped. Parsing never fails; structural problems are the validator's
    /// concern.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Segment::parse)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment whose id equals `id`.
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Like [`Message::segment`] but absence is an error naming the segment.
    pub fn require(&self, id: &str) -> Hl7Result<&Segment> {
        self.segment(id).ok_or_else(|| Hl7Error::MissingSegment {
            segment: id.to_string(),
        })
    }
}

impl Segment {
    pub fn parse(line: &str) -> Self {
        let id = line.chars().take(SEGMENT_ID_LEN).collect();
        let fields = line.split(FIELD_SEPARATOR).map(str::to_string).collect();
        Self { id, fields }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field at `index`, or `None` when absent or blank.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Component `component` (0-based) of field `index`, or `None` when absent or blank.
    pub fn component(&self, index: usize, component: usize) -> Option<&str> {
        self.field(index)?
            .split(COMPONENT_SEPARATOR)
            .nth(component)
            .filter(|c| !c.is_empty())
    }

    /// The leading component of a field, the conventional identifier position.
    pub fn leading_component(&self, index: usize) -> Option<&str> {
        self.component(index, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADT: &str = "MSH|^~\\&|App|Fac|RApp|RFac|20240101120000||ADT^A01|123456|P|2.5\r\n\
PID|1||123456^^^MRN||Doe^John||19900101|M|||123 Main St^^City^ST^12345||555-1234";

    #[test]
    fn splits_on_crlf_and_lf() {
        let crlf = Message::parse(ADT);
        let lf = Message::parse(&ADT.replace("\r\n", "\n"));
        assert_eq!(crlf, lf);
        assert_eq!(crlf.segments().len(), 2);
        assert_eq!(crlf.segments()[0].id(), "MSH");
        assert_eq!(crlf.segments()[1].id(), "PID");
    }

    #[test]
    fn field_positions_follow_hl7_numbering() {
        let message = Message::parse(ADT);
        let pid = message.segment("PID").expect("pid present");
        assert_eq!(pid.field(3), Some("123456^^^MRN"));
        assert_eq!(pid.leading_component(3), Some("123456"));
        assert_eq!(pid.component(5, 1), Some("John"));
        assert_eq!(pid.component(11, 2), Some("City"));
    }

    #[test]
    fn blank_fields_and_components_are_absent() {
        let message = Message::parse(ADT);
        let pid = message.segment("PID").expect("pid present");
        assert_eq!(pid.field(2), None);
        assert_eq!(pid.component(11, 1), None);
        assert_eq!(pid.field(40), None);
        assert_eq!(pid.component(5, 7), None);
    }

    #[test]
    fn require_names_missing_segment() {
        let message = Message::parse(ADT);
        let err = message.require("IN1").expect_err("no IN1");
        assert_eq!(err.to_string(), "IN1 segment not found");
    }

    #[test]
    fn first_matching_segment_wins() {
        let message = Message::parse("MSH|^~\\&|A|B|C|D\nOBX|1|first\nOBX|2|second");
        let obx = message.segment("OBX").expect("obx present");
        assert_eq!(obx.field(2), Some("first"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let message = Message::parse("MSH|^~\\&|A|B|C|D\n\n   \nPID|1");
        assert_eq!(message.segments().len(), 2);
        assert!(!message.is_empty());
        assert!(Message::parse("").is_empty());
    }
}
