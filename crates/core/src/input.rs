//! Decoding of the `message` member of a conversion request into raw HL7 text.

use hl7::{MessageDocument, ValidationIssue};
use serde_json::Value;

use crate::{CoreError, CoreResult};

const MESSAGE_FIELD: &str = "message";

/// Raw message text for either accepted form: a JSON string holding pipe-delimited text, or
/// the object form `{ "segments": [{ "segmentType", "fields" }] }`.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] with a single issue on `message` when the value is neither
/// form or the object does not match the expected shape.
pub fn message_text(message: &Value) -> CoreResult<String> {
    match message {
        Value::String(raw) => Ok(raw.clone()),
        Value::Object(_) => MessageDocument::from_value(message)
            .map(|document| document.to_raw())
            .map_err(|err| shape_error(err.to_string())),
        _ => Err(shape_error(
            "Message must be a string or a segment object".into(),
        )),
    }
}

fn shape_error(message: String) -> CoreError {
    CoreError::Validation(vec![ValidationIssue::new(MESSAGE_FIELD, message)])
}
