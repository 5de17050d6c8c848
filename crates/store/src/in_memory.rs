//! In-memory store — useful for tests and demo sessions.
//!
//! Reads take a shared lock and run concurrently; appends take the write
//! lock and serialize. The fetch counter exists so tests can assert that a
//! denied credential never reaches the store.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use medgate_core::error::{GatewayError, Result};
use medgate_core::record::{HistoryEntry, MedicationEntry, Patient, VitalsEntry};
use medgate_core::store::RecordStore;

/// An in-memory record store backed by Vecs behind an RwLock.
#[derive(Default)]
pub struct InMemoryStore {
    patients: RwLock<Vec<Patient>>,
    vitals: RwLock<Vec<VitalsEntry>>,
    medications: RwLock<Vec<MedicationEntry>>,
    history: RwLock<Vec<HistoryEntry>>,
    fetch_count: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read operations served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn count_fetch(&self) {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
    }

    async fn ensure_patient(&self, patient_id: &str) -> Result<()> {
        let patients = self.patients.read().await;
        if patients.iter().any(|p| p.id == patient_id) {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                patient_id: patient_id.into(),
            })
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list_patients(&self) -> Result<Vec<String>> {
        self.count_fetch();
        Ok(self.patients.read().await.iter().map(|p| p.id.clone()).collect())
    }

    async fn demographics(&self, patient_id: &str) -> Result<Patient> {
        self.count_fetch();
        self.patients
            .read()
            .await
            .iter()
            .find(|p| p.id == patient_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                patient_id: patient_id.into(),
            })
    }

    async fn vitals(&self, patient_id: &str, limit: usize) -> Result<Vec<VitalsEntry>> {
        self.count_fetch();
        self.ensure_patient(patient_id).await?;
        let vitals = self.vitals.read().await;
        let mut rows: Vec<VitalsEntry> = vitals
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.taken.cmp(&a.taken));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn medications(&self, patient_id: &str) -> Result<Vec<MedicationEntry>> {
        self.count_fetch();
        self.ensure_patient(patient_id).await?;
        Ok(self
            .medications
            .read()
            .await
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn history(&self, patient_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.count_fetch();
        self.ensure_patient(patient_id).await?;
        let history = self.history.read().await;
        let mut rows: Vec<HistoryEntry> = history
            .iter()
            .filter(|h| h.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.recorded.cmp(&a.recorded));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert_patient(&self, patient: Patient) -> Result<()> {
        let mut patients = self.patients.write().await;
        // Insert-or-ignore, matching the SQLite backend.
        if !patients.iter().any(|p| p.id == patient.id) {
            patients.push(patient);
        }
        Ok(())
    }

    async fn insert_vitals(&self, entry: VitalsEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        self.vitals.write().await.push(entry);
        Ok(())
    }

    async fn insert_medication(&self, entry: MedicationEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        self.medications.write().await.push(entry);
        Ok(())
    }

    async fn insert_history(&self, entry: HistoryEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        self.history.write().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use medgate_core::record::VitalKind;

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            sex: "F".into(),
            dob: NaiveDate::from_ymd_opt(1986, 3, 14).unwrap(),
            contact: None,
        }
    }

    fn hr(patient_id: &str, offset_mins: i64) -> VitalsEntry {
        VitalsEntry {
            patient_id: patient_id.into(),
            taken: Utc::now() - Duration::minutes(offset_mins),
            kind: VitalKind::HeartRate,
            value: "72".into(),
            unit: "bpm".into(),
        }
    }

    #[tokio::test]
    async fn unknown_patient_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.vitals("unknown-id", 3).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { patient_id } if patient_id == "unknown-id"));
    }

    #[tokio::test]
    async fn vitals_are_newest_first_and_limited() {
        let store = InMemoryStore::new();
        store.insert_patient(patient("P001")).await.unwrap();
        for offset in [30, 10, 20, 5] {
            store.insert_vitals(hr("P001", offset)).await.unwrap();
        }

        let rows = store.vitals("P001", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].taken > rows[1].taken);
    }

    #[tokio::test]
    async fn repeated_patient_insert_keeps_first_entry() {
        let store = InMemoryStore::new();
        store.insert_patient(patient("P001")).await.unwrap();
        store.insert_patient(patient("P001")).await.unwrap();

        let ids = store.list_patients().await.unwrap();
        assert_eq!(ids, vec!["P001"]);
    }

    #[tokio::test]
    async fn fetch_count_tracks_reads() {
        let store = InMemoryStore::new();
        store.insert_patient(patient("P001")).await.unwrap();
        assert_eq!(store.fetch_count(), 0);
        store.demographics("P001").await.unwrap();
        store.list_patients().await.unwrap();
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn medications_survive_superseding_appends() {
        let store = InMemoryStore::new();
        store.insert_patient(patient("P001")).await.unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        store
            .insert_medication(MedicationEntry {
                patient_id: "P001".into(),
                drug: "Metformin".into(),
                dose: "500 mg bd".into(),
                start,
                stop: None,
            })
            .await
            .unwrap();
        store
            .insert_medication(MedicationEntry {
                patient_id: "P001".into(),
                drug: "Metformin".into(),
                dose: "1000 mg bd".into(),
                start: start + Duration::days(90),
                stop: None,
            })
            .await
            .unwrap();

        // Append-only: the superseded dose is still there.
        let meds = store.medications("P001").await.unwrap();
        assert_eq!(meds.len(), 2);
    }
}
