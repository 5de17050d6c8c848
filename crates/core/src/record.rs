//! Record store entities — the fixed relational schema the gateway mediates.
//!
//! Four entity types keyed by patient identifier. Vitals, medications, and
//! history are append-only: corrections are modeled as new entries, never
//! as mutations of existing ones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

/// Core demographics for a patient. Name, date of birth, and contact are
/// PII and never cross the trust boundary unscrubbed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Stable unique identifier (e.g., "P001").
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    /// Date of birth, ISO format.
    pub dob: NaiveDate,
    /// Free-form contact info (phone, address).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// A single vitals measurement. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsEntry {
    pub patient_id: String,
    pub taken: DateTime<Utc>,
    pub kind: VitalKind,
    /// Measurement value as recorded ("120/80" for blood pressure).
    pub value: String,
    pub unit: String,
}

/// The closed set of vital measurement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    BloodPressure,
    HeartRate,
    Temperature,
    Weight,
    BloodGlucose,
}

impl VitalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalKind::BloodPressure => "blood_pressure",
            VitalKind::HeartRate => "heart_rate",
            VitalKind::Temperature => "temperature",
            VitalKind::Weight => "weight",
            VitalKind::BloodGlucose => "blood_glucose",
        }
    }
}

impl FromStr for VitalKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blood_pressure" => Ok(VitalKind::BloodPressure),
            "heart_rate" => Ok(VitalKind::HeartRate),
            "temperature" => Ok(VitalKind::Temperature),
            "weight" => Ok(VitalKind::Weight),
            "blood_glucose" => Ok(VitalKind::BloodGlucose),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown vital kind: {other}"
            ))),
        }
    }
}

/// A medication entry. Superseding entries do not delete prior ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub patient_id: String,
    pub drug: String,
    pub dose: String,
    pub start: NaiveDate,
    /// Absent while the medication is ongoing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<NaiveDate>,
}

impl MedicationEntry {
    /// Whether this medication has no recorded stop date.
    pub fn is_ongoing(&self) -> bool {
        self.stop.is_none()
    }
}

/// A clinical history note (problem / social / surgical history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub patient_id: String,
    /// Note kind: "smoking", "surgery", "allergy", ...
    pub kind: String,
    pub details: String,
    pub recorded: DateTime<Utc>,
    pub author: String,
}

/// The closed enumeration of record categories a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    Demographics,
    Vitals,
    Medications,
    History,
}

impl RecordCategory {
    /// All categories, in a stable order.
    pub const ALL: [RecordCategory; 4] = [
        RecordCategory::Demographics,
        RecordCategory::Vitals,
        RecordCategory::Medications,
        RecordCategory::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::Demographics => "demographics",
            RecordCategory::Vitals => "vitals",
            RecordCategory::Medications => "medications",
            RecordCategory::History => "history",
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordCategory {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demographics" => Ok(RecordCategory::Demographics),
            "vitals" => Ok(RecordCategory::Vitals),
            "medications" => Ok(RecordCategory::Medications),
            "history" => Ok(RecordCategory::History),
            other => Err(GatewayError::InvalidCategory {
                category: other.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for cat in RecordCategory::ALL {
            assert_eq!(cat.as_str().parse::<RecordCategory>().unwrap(), cat);
        }
    }

    #[test]
    fn unknown_category_is_invalid() {
        let err = "billing".parse::<RecordCategory>().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCategory { category } if category == "billing"));
    }

    #[test]
    fn medication_without_stop_is_ongoing() {
        let med = MedicationEntry {
            patient_id: "P001".into(),
            drug: "Metformin".into(),
            dose: "500 mg bd".into(),
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            stop: None,
        };
        assert!(med.is_ongoing());
    }

    #[test]
    fn patient_serializes_without_empty_contact() {
        let patient = Patient {
            id: "P001".into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            sex: "F".into(),
            dob: NaiveDate::from_ymd_opt(1986, 3, 14).unwrap(),
            contact: None,
        };
        let json = serde_json::to_string(&patient).unwrap();
        assert!(!json.contains("contact"));
    }
}
