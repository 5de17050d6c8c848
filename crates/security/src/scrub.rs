//! PII scrubber — field-level redaction before data leaves the trust
//! boundary.
//!
//! Classification is a static declarative table per entity type, not
//! conditionals scattered through the pipeline: every field of every known
//! entity has an explicit class, and a field missing from its table is
//! treated as identifying (fail closed, never fail open). Scrubbing is
//! idempotent — the masked `age_band` field is itself classified clinical,
//! so scrubbing an already-scrubbed record is a no-op.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use medgate_core::error::{GatewayError, Result};
use medgate_core::record::RecordCategory;
use medgate_core::store::CategoryRecords;

/// How a field is treated when a record crosses the trust boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Removed entirely.
    Identifying,
    /// Masked (date of birth becomes a ten-year age band).
    QuasiIdentifying,
    /// Passed through unchanged.
    Clinical,
}

/// Classification table for one entity type.
type FieldTable = &'static [(&'static str, FieldClass)];

const PATIENT_FIELDS: FieldTable = &[
    ("id", FieldClass::Identifying),
    ("first_name", FieldClass::Identifying),
    ("last_name", FieldClass::Identifying),
    ("contact", FieldClass::Identifying),
    ("dob", FieldClass::QuasiIdentifying),
    ("sex", FieldClass::Clinical),
    ("age_band", FieldClass::Clinical),
];

const VITALS_FIELDS: FieldTable = &[
    ("patient_id", FieldClass::Identifying),
    ("taken", FieldClass::Clinical),
    ("kind", FieldClass::Clinical),
    ("value", FieldClass::Clinical),
    ("unit", FieldClass::Clinical),
];

const MEDICATION_FIELDS: FieldTable = &[
    ("patient_id", FieldClass::Identifying),
    ("drug", FieldClass::Clinical),
    ("dose", FieldClass::Clinical),
    ("start", FieldClass::Clinical),
    ("stop", FieldClass::Clinical),
];

const HISTORY_FIELDS: FieldTable = &[
    ("patient_id", FieldClass::Identifying),
    ("author", FieldClass::Identifying),
    ("kind", FieldClass::Clinical),
    ("details", FieldClass::Clinical),
    ("recorded", FieldClass::Clinical),
];

fn table_for(category: RecordCategory) -> FieldTable {
    match category {
        RecordCategory::Demographics => PATIENT_FIELDS,
        RecordCategory::Vitals => VITALS_FIELDS,
        RecordCategory::Medications => MEDICATION_FIELDS,
        RecordCategory::History => HISTORY_FIELDS,
    }
}

/// Look up a field's class. Unlisted fields default to identifying.
fn classify(table: FieldTable, field: &str) -> FieldClass {
    table
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, class)| *class)
        .unwrap_or(FieldClass::Identifying)
}

/// The PII scrubber.
pub struct Scrubber;

impl Scrubber {
    pub fn new() -> Self {
        Self
    }

    /// Scrub one fetched category into its redacted JSON section.
    pub fn scrub(&self, records: &CategoryRecords) -> Result<Value> {
        let category = records.category();
        let value = match records {
            CategoryRecords::Demographics(p) => serde_json::to_value(p),
            CategoryRecords::Vitals(v) => serde_json::to_value(v),
            CategoryRecords::Medications(m) => serde_json::to_value(m),
            CategoryRecords::History(h) => serde_json::to_value(h),
        }
        .map_err(|e| GatewayError::ScrubFailure(format!("{category}: {e}")))?;
        self.scrub_json(&value, category)
    }

    /// Scrub an entity (or list of entities) already in JSON form.
    ///
    /// Total over the known entity shapes: objects are walked field by
    /// field, arrays element-wise. Anything else cannot be classified and
    /// is a `ScrubFailure` — the request fails rather than passing the
    /// value through.
    pub fn scrub_json(&self, value: &Value, category: RecordCategory) -> Result<Value> {
        let table = table_for(category);
        match value {
            Value::Object(map) => Ok(Value::Object(scrub_object(map, table, category))),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) => {
                            out.push(Value::Object(scrub_object(map, table, category)))
                        }
                        other => {
                            return Err(GatewayError::ScrubFailure(format!(
                                "{category} entry is not an object: {other}"
                            )));
                        }
                    }
                }
                Ok(Value::Array(out))
            }
            other => Err(GatewayError::ScrubFailure(format!(
                "{category} record is not an object: {other}"
            ))),
        }
    }
}

impl Default for Scrubber {
    fn default() -> Self {
        Self::new()
    }
}

fn scrub_object(map: &Map<String, Value>, table: FieldTable, category: RecordCategory) -> Map<String, Value> {
    let mut out = Map::new();
    for (field, value) in map {
        match classify(table, field) {
            FieldClass::Clinical => {
                out.insert(field.clone(), value.clone());
            }
            FieldClass::QuasiIdentifying => {
                if let Some((masked_field, masked_value)) = mask_field(field, value) {
                    out.insert(masked_field.into(), masked_value);
                }
                // Unmaskable quasi-identifier: dropped, same as identifying.
            }
            FieldClass::Identifying => {
                if !table.iter().any(|(name, _)| name == field) {
                    warn!(%category, field, "unclassified field dropped (fail closed)");
                }
            }
        }
    }
    out
}

/// Mask a quasi-identifying field. `dob` becomes a ten-year age band;
/// a value that cannot be masked is removed.
fn mask_field(field: &str, value: &Value) -> Option<(&'static str, Value)> {
    if field != "dob" {
        return None;
    }
    let dob = value.as_str()?.parse::<NaiveDate>().ok()?;
    Some(("age_band", Value::String(age_band(dob))))
}

/// Ten-year age band for a date of birth, e.g. "40-49".
fn age_band(dob: NaiveDate) -> String {
    let today = Utc::now().date_naive();
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    let age = age.max(0);
    let low = (age / 10) * 10;
    format!("{}-{}", low, low + 9)
}
