//! Code translators.
//!
//! Every translator is total: unknown input falls back to a documented default (or to an absent
//! value) instead of failing.

use crate::datatypes::{CodeableConcept, Coding};
use serde::{Deserialize, Serialize};

/// FHIR `AdministrativeGender`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

/// FHIR `RequestStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Draft,
    Active,
    OnHold,
    Revoked,
    Completed,
    EnteredInError,
    Unknown,
}

/// FHIR `RequestPriority`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    Routine,
    Urgent,
    Asap,
    Stat,
}

/// HL7 table 0001 (administrative sex) to FHIR gender. Matching ignores case.
pub fn gender(code: Option<&str>) -> Option<AdministrativeGender> {
    match code?.to_ascii_uppercase().as_str() {
        "M" => Some(AdministrativeGender::Male),
        "F" => Some(AdministrativeGender::Female),
        "O" => Some(AdministrativeGender::Other),
        "U" => Some(AdministrativeGender::Unknown),
        _ => None,
    }
}

/// Insured-to-patient relationship (HL7 tables 0063/0344) as a single coding.
///
/// Unmapped codes become `other` / `Other`.
pub fn relationship(code: &str) -> CodeableConcept {
    let (code, display) = match code {
        "01" | "18" | "SEL" => ("self", "Self"),
        "02" | "SPO" => ("spouse", "Spouse"),
        "03" | "CHD" => ("child", "Child"),
        "04" => ("natural child", "Natural Child"),
        "05" => ("step child", "Step Child"),
        _ => ("other", "Other"),
    };
    CodeableConcept::single(Coding::new(code, display))
}

/// Whether a relationship code means the insured is the patient.
pub fn is_self_relationship(code: &str) -> bool {
    matches!(code, "18" | "SEL")
}

/// HL7 table 0038 (order status) to FHIR request status. Defaults to `active`.
pub fn order_status(code: Option<&str>) -> RequestStatus {
    match code.unwrap_or_default() {
        "CA" | "DC" => RequestStatus::Revoked,
        "CM" => RequestStatus::Completed,
        "ER" => RequestStatus::EnteredInError,
        "HD" => RequestStatus::OnHold,
        // A, IP, SC and anything unmapped
        _ => RequestStatus::Active,
    }
}

/// HL7 priority codes to FHIR request priority. Defaults to `routine`.
pub fn priority(code: Option<&str>) -> RequestPriority {
    match code.unwrap_or_default() {
        "S" => RequestPriority::Stat,
        "A" => RequestPriority::Asap,
        _ => RequestPriority::Routine,
    }
}

/// Convert a `YYYYMMDD[...]` token to `YYYY-MM-DD`.
///
/// Only the first eight characters are used; anything shorter yields `None`.
pub fn date(token: Option<&str>) -> Option<String> {
    let head: Vec<char> = token?.chars().take(8).collect();
    if head.len() < 8 {
        return None;
    }
    let year: String = head[0..4].iter().collect();
    let month: String = head[4..6].iter().collect();
    let day: String = head[6..8].iter().collect();
    Some(format!("{year}-{month}-{day}"))
}
