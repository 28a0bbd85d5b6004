//! Patient resource and its mapper from the PID segment.
//!
//! | Element | Source |
//! |---|---|
//! | `id`, `identifier` | PID-3, leading component |
//! | `name` | PID-5 (family ^ given) |
//! | `birthDate` | PID-7 via [`codes::date`] |
//! | `gender` | PID-8 via [`codes::gender`] |
//! | `address` | PID-11 (street ^ ^ city ^ state ^ postal code) |
//! | `telecom` | PID-13 as a single `phone` entry |

use crate::codes::{self, AdministrativeGender};
use crate::datatypes::{Address, ContactPoint, HumanName, Identifier};
use crate::{FhirError, FhirResult};
use hl7::constants::PID;
use hl7::{Message, Segment};
use serde::{Deserialize, Serialize};

const PATIENT_ID: usize = 3;
const PATIENT_NAME: usize = 5;
const BIRTH_DATE: usize = 7;
const SEX: usize = 8;
const ADDRESS: usize = 11;
const HOME_PHONE: usize = 13;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

impl Patient {
    /// Map the first PID segment of `message` to a Patient.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Hl7`] if the message has no PID segment.
    pub fn from_message(message: &Message) -> FhirResult<Self> {
        let pid = message.require(PID)?;
        let id = pid.leading_component(PATIENT_ID).map(str::to_string);

        Ok(Self {
            identifier: id.iter().map(Identifier::new).collect(),
            id,
            name: name(pid).into_iter().collect(),
            birth_date: codes::date(pid.field(BIRTH_DATE)),
            gender: codes::gender(pid.field(SEX)),
            address: address(pid).into_iter().collect(),
            telecom: pid
                .field(HOME_PHONE)
                .map(|phone| ContactPoint {
                    system: "phone".into(),
                    value: phone.to_string(),
                })
                .into_iter()
                .collect(),
        })
    }
}

/// Patient id used by resources that reference the patient (beneficiary, subject).
///
/// Unlike the Patient mapper itself, referencing resources cannot be built without it.
pub(crate) fn patient_id(message: &Message) -> FhirResult<String> {
    let pid = message.require(PID)?;
    pid.leading_component(PATIENT_ID)
        .map(str::to_string)
        .ok_or_else(|| FhirError::MissingField {
            segment: PID.into(),
            field: "Patient ID".into(),
        })
}

fn name(pid: &Segment) -> Option<HumanName> {
    pid.field(PATIENT_NAME)?;
    Some(HumanName {
        family: pid.component(PATIENT_NAME, 0).map(str::to_string),
        given: pid
            .component(PATIENT_NAME, 1)
            .map(str::to_string)
            .into_iter()
            .collect(),
    })
}

fn address(pid: &Segment) -> Option<Address> {
    pid.field(ADDRESS)?;
    let part = |n| pid.component(ADDRESS, n).map(str::to_string);
    Some(Address {
        line: part(0).into_iter().collect(),
        city: part(2),
        state: part(3),
        postal_code: part(4),
    })
}
