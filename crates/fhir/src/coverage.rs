//! Coverage resource and its mapper from the IN1 segment.
//!
//! The beneficiary is always the patient identified in PID. When the insured's relationship to
//! the patient is "self" the subscriber is left out, since the beneficiary is the subscriber.

use crate::codes;
use crate::datatypes::{CodeOnly, CodeableConcept, Identifier, Period, Reference};
use crate::patient::patient_id;
use crate::FhirResult;
use hl7::constants::IN1;
use hl7::{Message, Segment};
use serde::{Deserialize, Serialize};

const PLAN_ID: usize = 2;
const COMPANY_ID: usize = 3;
const COMPANY_NAME: usize = 4;
const PLAN_EFFECTIVE_DATE: usize = 12;
const PLAN_EXPIRATION_DATE: usize = 13;
const INSURED_NAME: usize = 16;
const INSURED_RELATIONSHIP: usize = 17;
const COMPANY_PLAN_CODE: usize = 35;
const POLICY_NUMBER: usize = 36;

const UNKNOWN_PAYOR: &str = "Unknown Insurance";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageStatus {
    Active,
    Cancelled,
    Draft,
    EnteredInError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageClass {
    #[serde(rename = "type")]
    pub class_type: CodeOnly,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    pub status: CoverageStatus,
    pub beneficiary: Reference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<CodeableConcept>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    pub payor: Vec<Reference>,
    #[serde(default, rename = "class", skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<CoverageClass>,
}

impl Coverage {
    /// Map the first IN1 segment of `message` to a Coverage for the PID patient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError::Hl7`] if IN1 or PID is missing, and
    /// [`crate::FhirError::MissingField`] if PID carries no patient id.
    pub fn from_message(message: &Message) -> FhirResult<Self> {
        let in1 = message.require(IN1)?;
        let patient_id = patient_id(message)?;
        let id = in1.leading_component(PLAN_ID).map(str::to_string);
        let relationship_code = in1.field(INSURED_RELATIONSHIP);

        Ok(Self {
            identifier: id.iter().map(Identifier::new).collect(),
            id,
            status: CoverageStatus::Active,
            beneficiary: Reference::to("Patient", &patient_id),
            subscriber: subscriber(in1, relationship_code),
            subscriber_id: in1.leading_component(POLICY_NUMBER).map(str::to_string),
            relationship: relationship_code.map(codes::relationship),
            period: period(in1),
            payor: vec![payor(in1)],
            classes: group_class(in1).into_iter().collect(),
        })
    }
}

fn subscriber(in1: &Segment, relationship_code: Option<&str>) -> Option<Reference> {
    if relationship_code.is_some_and(codes::is_self_relationship) {
        return None;
    }
    in1.leading_component(INSURED_NAME)
        .map(|name| Reference::to("RelatedPerson", name))
}

/// Present only when a start date converts; the end date is optional.
fn period(in1: &Segment) -> Option<Period> {
    let start = codes::date(in1.field(PLAN_EFFECTIVE_DATE))?;
    Some(Period {
        start,
        end: codes::date(in1.field(PLAN_EXPIRATION_DATE)),
    })
}

fn payor(in1: &Segment) -> Reference {
    let display = in1
        .field(COMPANY_NAME)
        .or_else(|| in1.field(COMPANY_ID))
        .unwrap_or(UNKNOWN_PAYOR);
    Reference::display(display)
}

fn group_class(in1: &Segment) -> Option<CoverageClass> {
    let value = in1.leading_component(COMPANY_PLAN_CODE)?;
    Some(CoverageClass {
        class_type: CodeOnly {
            code: "group".into(),
        },
        value: value.to_string(),
        name: Some("Group Number".into()),
    })
}
