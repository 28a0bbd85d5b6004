//! Delimiters and well-known segment ids.

/// Separator between fields within a segment.
pub const FIELD_SEPARATOR: char = '|';

/// Separator between components within a field.
pub const COMPONENT_SEPARATOR: char = '^';

/// Canonical encoding characters carried in MSH-2 (component, repetition, escape, subcomponent).
pub const ENCODING_CHARACTERS: &str = "^~\\&";

/// Length of a segment id.
pub const SEGMENT_ID_LEN: usize = 3;

/// Message header.
pub const MSH: &str = "MSH";

/// Patient identification.
pub const PID: &str = "PID";

/// Insurance.
pub const IN1: &str = "IN1";

/// Observation request (order detail).
pub const OBR: &str = "OBR";

/// Common order.
pub const ORC: &str = "ORC";
