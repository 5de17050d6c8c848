//! Demo seed data — five stub patients with vitals, medications, and
//! history entries.

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use medgate_core::error::Result;
use medgate_core::record::{HistoryEntry, MedicationEntry, Patient, VitalKind, VitalsEntry};
use medgate_core::store::RecordStore;

/// Seed the store with the demo patient set. Idempotent for patients
/// (insert-or-ignore); entry tables are append-only so repeated seeding
/// adds duplicate entries — intended for fresh databases.
pub async fn seed_demo(store: &dyn RecordStore) -> Result<()> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let now = Utc::now();

    let patients = [
        ("P001", "Ada", "Obi", "F", date(1986, 3, 14)),
        ("P002", "Chima", "Okeke", "M", date(1978, 7, 22)),
        ("P003", "Funmi", "Ade", "F", date(1993, 11, 5)),
        ("P004", "Yusuf", "Bello", "M", date(1965, 1, 30)),
        ("P005", "Tayo", "Ogunle", "M", date(2002, 6, 9)),
    ];
    for (id, first, last, sex, dob) in patients {
        store
            .insert_patient(Patient {
                id: id.into(),
                first_name: first.into(),
                last_name: last.into(),
                sex: sex.into(),
                dob,
                contact: None,
            })
            .await?;
    }

    let vitals = [
        ("P001", VitalKind::BloodPressure, "120/80", "mmHg"),
        ("P001", VitalKind::HeartRate, "72", "bpm"),
        ("P001", VitalKind::Weight, "65", "kg"),
        ("P001", VitalKind::BloodGlucose, "11", "mmol/L"),
        ("P002", VitalKind::BloodPressure, "181/132", "mmHg"),
        ("P002", VitalKind::HeartRate, "80", "bpm"),
        ("P002", VitalKind::Temperature, "37.1", "C"),
        ("P003", VitalKind::BloodPressure, "110/70", "mmHg"),
        ("P003", VitalKind::BloodGlucose, "5.0", "mmol/L"),
    ];
    for (i, (id, kind, value, unit)) in vitals.into_iter().enumerate() {
        store
            .insert_vitals(VitalsEntry {
                patient_id: id.into(),
                taken: now - Duration::minutes(i as i64),
                kind,
                value: value.into(),
                unit: unit.into(),
            })
            .await?;
    }

    let meds = [
        ("P001", "Metformin", "500 mg bd", date(2025, 1, 1), None),
        ("P002", "Lisinopril", "10 mg od", date(2024, 10, 12), None),
        (
            "P003",
            "Amoxicillin",
            "500 mg tds",
            date(2025, 5, 4),
            Some(date(2025, 5, 11)),
        ),
    ];
    for (id, drug, dose, start, stop) in meds {
        store
            .insert_medication(MedicationEntry {
                patient_id: id.into(),
                drug: drug.into(),
                dose: dose.into(),
                start,
                stop,
            })
            .await?;
    }

    let history = [
        ("P001", "smoking", "10 pack-years; quit 2020"),
        ("P002", "surgery", "Appendectomy 2005"),
        ("P002", "history", "Family history of hypertension"),
        ("P003", "allergy", "Penicillin rash"),
    ];
    for (id, kind, details) in history {
        store
            .insert_history(HistoryEntry {
                patient_id: id.into(),
                kind: kind.into(),
                details: details.into(),
                recorded: now,
                author: "intake".into(),
            })
            .await?;
    }

    info!(backend = store.name(), "demo records seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;

    #[tokio::test]
    async fn seed_populates_all_categories() {
        let store = InMemoryStore::new();
        seed_demo(&store).await.unwrap();

        let ids = store.list_patients().await.unwrap();
        assert_eq!(ids.len(), 5);

        let meds = store.medications("P001").await.unwrap();
        assert_eq!(meds[0].drug, "Metformin");

        let history = store.history("P002", 5).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn reseeding_does_not_duplicate_patients() {
        let store = InMemoryStore::new();
        seed_demo(&store).await.unwrap();
        seed_demo(&store).await.unwrap();

        let ids = store.list_patients().await.unwrap();
        assert_eq!(ids.len(), 5);
    }
}
