//! ServiceRequest resource and its mapper from OBR (preferred) or ORC.

use crate::codes::{self, RequestPriority, RequestStatus};
use crate::datatypes::{CodeableConcept, Coding, Identifier, Reference};
use crate::patient::patient_id;
use crate::FhirResult;
use hl7::constants::{OBR, ORC};
use hl7::{Hl7Error, Message, Segment};
use serde::{Deserialize, Serialize};

const PLACER_ORDER_NUMBER: usize = 2;
const FILLER_ORDER_NUMBER: usize = 3;
const SERVICE_CODE: usize = 4;
const STATUS: usize = 5;
const ORDERING_PROVIDER: usize = 16;

const PATIENT_REFERRAL: (&str, &str) = ("3457005", "Patient referral");
const UNKNOWN_SERVICE: &str = "Unknown Service";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestIntent {
    Proposal,
    Plan,
    Directive,
    Order,
    OriginalOrder,
    ReflexOrder,
    FillerOrder,
    InstanceOrder,
    Option,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    pub status: RequestStatus,
    pub intent: RequestIntent,
    pub category: Vec<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,
    pub subject: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Reference>,
    pub priority: RequestPriority,
}

impl ServiceRequest {
    /// Map the order segment (OBR, else ORC) of `message` to a ServiceRequest.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::Hl7`] if PID or both order segments are missing.
    pub fn from_message(message: &Message) -> FhirResult<Self> {
        let order = order_segment(message)?;
        let patient_id = patient_id(message)?;
        let id = order_identifier(order);
        let status_code = order.field(STATUS);

        Ok(Self {
            identifier: id.iter().map(Identifier::new).collect(),
            id,
            status: codes::order_status(status_code),
            intent: RequestIntent::Order,
            category: vec![CodeableConcept::single(Coding::new(
                PATIENT_REFERRAL.0,
                PATIENT_REFERRAL.1,
            ))],
            code: service_code(order),
            subject: Reference::to("Patient", &patient_id),
            requester: order
                .leading_component(ORDERING_PROVIDER)
                .map(|provider| Reference::to("Practitioner", provider)),
            priority: codes::priority(status_code),
        })
    }
}

fn order_segment(message: &Message) -> FhirResult<&Segment> {
    message
        .segment(OBR)
        .or_else(|| message.segment(ORC))
        .ok_or_else(|| {
            Hl7Error::MissingSegment {
                segment: format!("{OBR} or {ORC}"),
            }
            .into()
        })
}

/// Placer order number, or the filler order number when no placer number was sent.
fn order_identifier(order: &Segment) -> Option<String> {
    let field = if order.field(PLACER_ORDER_NUMBER).is_some() {
        PLACER_ORDER_NUMBER
    } else {
        FILLER_ORDER_NUMBER
    };
    order.leading_component(field).map(str::to_string)
}

fn service_code(order: &Segment) -> Option<CodeableConcept> {
    order.field(SERVICE_CODE)?;
    let code = order.component(SERVICE_CODE, 0);
    let display = order
        .component(SERVICE_CODE, 1)
        .or(code)
        .unwrap_or(UNKNOWN_SERVICE);
    Some(CodeableConcept::single(Coding::new(
        code.unwrap_or_default(),
        display,
    )))
}
