//! RecordStore trait — the abstraction over the patient-record datastore.
//!
//! The adapter translates typed queries into rows and nothing more: no
//! filtering, no transformation. Relevance selection belongs to the context
//! selector and redaction to the scrubber. Implementations: SQLite
//! (production), in-memory (tests).

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{HistoryEntry, MedicationEntry, Patient, RecordCategory, VitalsEntry};

/// Default number of vitals rows returned when no limit is given.
pub const DEFAULT_VITALS_LIMIT: usize = 3;
/// Default number of history rows returned when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Records fetched for a single category.
#[derive(Debug, Clone)]
pub enum CategoryRecords {
    Demographics(Patient),
    Vitals(Vec<VitalsEntry>),
    Medications(Vec<MedicationEntry>),
    History(Vec<HistoryEntry>),
}

impl CategoryRecords {
    pub fn category(&self) -> RecordCategory {
        match self {
            CategoryRecords::Demographics(_) => RecordCategory::Demographics,
            CategoryRecords::Vitals(_) => RecordCategory::Vitals,
            CategoryRecords::Medications(_) => RecordCategory::Medications,
            CategoryRecords::History(_) => RecordCategory::History,
        }
    }
}

/// The core RecordStore trait.
///
/// Reads are side-effect-free and may run concurrently. Writes are
/// append-only and serialize behind the backend's single-writer discipline.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// All known patient identifiers.
    async fn list_patients(&self) -> Result<Vec<String>>;

    /// Core demographics. `NotFound` when the id is unknown.
    async fn demographics(&self, patient_id: &str) -> Result<Patient>;

    /// Latest vitals, newest first, at most `limit` rows.
    async fn vitals(&self, patient_id: &str, limit: usize) -> Result<Vec<VitalsEntry>>;

    /// All medication entries for the patient.
    async fn medications(&self, patient_id: &str) -> Result<Vec<MedicationEntry>>;

    /// Latest history entries, newest first, at most `limit` rows.
    async fn history(&self, patient_id: &str, limit: usize) -> Result<Vec<HistoryEntry>>;

    /// Register a patient (demo seeding and onboarding).
    async fn insert_patient(&self, patient: Patient) -> Result<()>;

    /// Append a vitals entry.
    async fn insert_vitals(&self, entry: VitalsEntry) -> Result<()>;

    /// Append a medication entry.
    async fn insert_medication(&self, entry: MedicationEntry) -> Result<()>;

    /// Append a history entry.
    async fn insert_history(&self, entry: HistoryEntry) -> Result<()>;

    /// Fetch one category with default limits. Dispatches to the typed
    /// accessors; `NotFound` propagates from them unchanged.
    async fn fetch(&self, patient_id: &str, category: RecordCategory) -> Result<CategoryRecords> {
        match category {
            RecordCategory::Demographics => self
                .demographics(patient_id)
                .await
                .map(CategoryRecords::Demographics),
            RecordCategory::Vitals => self
                .vitals(patient_id, DEFAULT_VITALS_LIMIT)
                .await
                .map(CategoryRecords::Vitals),
            RecordCategory::Medications => self
                .medications(patient_id)
                .await
                .map(CategoryRecords::Medications),
            RecordCategory::History => self
                .history(patient_id, DEFAULT_HISTORY_LIMIT)
                .await
                .map(CategoryRecords::History),
        }
    }
}
