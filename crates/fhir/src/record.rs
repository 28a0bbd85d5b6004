//! Closed set of supported resource types and the tagged union of mapped resources.

use crate::{Coverage, FhirError, FhirResult, Patient, ServiceRequest};
use hl7::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A resource type this bridge can map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Patient,
    Coverage,
    ServiceRequest,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Patient,
        ResourceType::Coverage,
        ResourceType::ServiceRequest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Coverage => "Coverage",
            ResourceType::ServiceRequest => "ServiceRequest",
        }
    }

    /// Parse a comma-separated list such as `"Patient, Coverage"`.
    ///
    /// Names are trimmed and blank entries ignored. Order and duplicates are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidResourceType`] for the first unrecognised name.
    pub fn parse_list(csv: &str) -> FhirResult<Vec<ResourceType>> {
        csv.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<ResourceType>)
            .collect()
    }

    /// Run the mapper for this resource type.
    pub fn map(self, message: &Message) -> FhirResult<ResourceRecord> {
        let record = match self {
            ResourceType::Patient => ResourceRecord::Patient(Patient::from_message(message)?),
            ResourceType::Coverage => ResourceRecord::Coverage(Coverage::from_message(message)?),
            ResourceType::ServiceRequest => {
                ResourceRecord::ServiceRequest(ServiceRequest::from_message(message)?)
            }
        };
        tracing::debug!(resource_type = self.as_str(), id = ?record.id(), "mapped resource");
        Ok(record)
    }
}

impl FromStr for ResourceType {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FhirError::InvalidResourceType(s.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A mapped resource, serialised with its `resourceType` discriminator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum ResourceRecord {
    Patient(Patient),
    Coverage(Coverage),
    ServiceRequest(ServiceRequest),
}

impl ResourceRecord {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceRecord::Patient(_) => ResourceType::Patient,
            ResourceRecord::Coverage(_) => ResourceType::Coverage,
            ResourceRecord::ServiceRequest(_) => ResourceType::ServiceRequest,
        }
    }

    /// Logical id taken from the governing segment's leading identifier component.
    pub fn id(&self) -> Option<&str> {
        match self {
            ResourceRecord::Patient(r) => r.id.as_deref(),
            ResourceRecord::Coverage(r) => r.id.as_deref(),
            ResourceRecord::ServiceRequest(r) => r.id.as_deref(),
        }
    }

    /// Value to use for an identifier search, if the record carries one.
    pub fn identifier(&self) -> Option<&str> {
        let identifiers = match self {
            ResourceRecord::Patient(r) => &r.identifier,
            ResourceRecord::Coverage(r) => &r.identifier,
            ResourceRecord::ServiceRequest(r) => &r.identifier,
        };
        identifiers
            .first()
            .map(|i| i.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn to_json(&self) -> FhirResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "MSH|^~\\&|App|Fac|RApp|RFac|20240101120000||ADT^A01|123456|P|2.5\n\
PID|1||123456||Doe^John||19900101|M|||123 Main St^^City^ST^12345||555-1234";

    #[test]
    fn parses_comma_separated_list_in_order() {
        let types = ResourceType::parse_list("ServiceRequest, Patient,,Coverage ").expect("valid");
        assert_eq!(
            types,
            vec![
                ResourceType::ServiceRequest,
                ResourceType::Patient,
                ResourceType::Coverage
            ]
        );
        assert!(ResourceType::parse_list("  ").expect("blank").is_empty());
    }

    #[test]
    fn rejects_unknown_names() {
        let err = ResourceType::parse_list("Patient,Unknown").expect_err("invalid");
        assert!(matches!(err, FhirError::InvalidResourceType(name) if name == "Unknown"));
        assert!("patient".parse::<ResourceType>().is_err());
        assert!("Observation".parse::<ResourceType>().is_err());
    }

    #[test]
    fn maps_scenario_a_patient() {
        let message = Message::parse(SCENARIO_A);
        let record = ResourceType::Patient.map(&message).expect("map");
        assert_eq!(record.resource_type(), ResourceType::Patient);
        assert_eq!(record.id(), Some("123456"));
        assert_eq!(record.identifier(), Some("123456"));

        let json = record.to_json().expect("json");
        assert_eq!(json["resourceType"], "Patient");
        assert_eq!(json["id"], "123456");
        assert_eq!(json["name"][0]["family"], "Doe");
        assert_eq!(json["name"][0]["given"][0], "John");
        assert_eq!(json["birthDate"], "1990-01-01");
        assert_eq!(json["gender"], "male");
    }

    #[test]
    fn scenario_b_coverage_without_insurance_fails() {
        let message = Message::parse(SCENARIO_A);
        let err = ResourceType::Coverage.map(&message).expect_err("no IN1");
        assert!(err.is_malformed_message());
        assert_eq!(err.to_string(), "IN1 segment not found");
    }

    #[test]
    fn record_round_trips_through_tagged_json() {
        let message = Message::parse(SCENARIO_A);
        let record = ResourceType::Patient.map(&message).expect("map");
        let json = record.to_json().expect("json");
        let back: ResourceRecord = serde_json::from_value(json).expect("deserialise");
        assert_eq!(back, record);
    }

    #[test]
    fn record_without_identifier_has_no_search_value() {
        let message = Message::parse("MSH|^~\\&|A|B|C|D\nPID|1||||Doe");
        let record = ResourceType::Patient.map(&message).expect("map");
        assert_eq!(record.identifier(), None);
    }
}
