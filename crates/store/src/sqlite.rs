//! SQLite record store backed by sqlx.
//!
//! One database file with four tables mirroring the upstream EHR schema:
//! `patients`, `vitals`, `meds`, `history`. WAL journaling lets concurrent
//! readers proceed while the pool serializes writers. All entry tables are
//! append-only: there is no UPDATE or DELETE anywhere in this module.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

use medgate_core::error::{GatewayError, Result};
use medgate_core::record::{
    HistoryEntry, MedicationEntry, Patient, VitalKind, VitalsEntry,
};
use medgate_core::store::RecordStore;

/// A SQLite-backed record store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// Pass `":memory:"` for an in-process ephemeral database.
    pub async fn new(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| GatewayError::Store(format!("invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // An in-memory database is per-connection, so it must stay pinned
        // to a single connection that never gets recycled.
        let pool_options = if path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| GatewayError::Store(format!("failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite record store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id         TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name  TEXT NOT NULL,
                sex        TEXT NOT NULL,
                dob        TEXT NOT NULL,
                contact    TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS vitals (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id TEXT NOT NULL REFERENCES patients(id),
                taken      TEXT NOT NULL,
                kind       TEXT NOT NULL,
                value      TEXT NOT NULL,
                unit       TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS meds (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id TEXT NOT NULL REFERENCES patients(id),
                drug       TEXT NOT NULL,
                dose       TEXT NOT NULL,
                start      TEXT NOT NULL,
                stop       TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS history (
                iid        INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id TEXT NOT NULL REFERENCES patients(id),
                kind       TEXT NOT NULL,
                details    TEXT NOT NULL,
                recorded   TEXT NOT NULL,
                author     TEXT NOT NULL
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| GatewayError::Store(format!("migration failed: {e}")))?;
        }
        Ok(())
    }

    async fn ensure_patient(&self, patient_id: &str) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients WHERE id = ?")
            .bind(patient_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;
        if exists > 0 {
            Ok(())
        } else {
            Err(GatewayError::NotFound {
                patient_id: patient_id.into(),
            })
        }
    }
}

fn store_err(e: sqlx::Error) -> GatewayError {
    GatewayError::Store(e.to_string())
}

fn parse_date(raw: &str, column: &str) -> Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|e| GatewayError::Store(format!("corrupt {column} date '{raw}': {e}")))
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| GatewayError::Store(format!("corrupt {column} timestamp '{raw}': {e}")))
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list_patients(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT id FROM patients ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)
    }

    async fn demographics(&self, patient_id: &str) -> Result<Patient> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, sex, dob, contact FROM patients WHERE id = ?",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| GatewayError::NotFound {
            patient_id: patient_id.into(),
        })?;

        Ok(Patient {
            id: row.get("id"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            sex: row.get("sex"),
            dob: parse_date(row.get::<String, _>("dob").as_str(), "dob")?,
            contact: row.get("contact"),
        })
    }

    async fn vitals(&self, patient_id: &str, limit: usize) -> Result<Vec<VitalsEntry>> {
        self.ensure_patient(patient_id).await?;
        let rows = sqlx::query(
            "SELECT patient_id, taken, kind, value, unit FROM vitals \
             WHERE patient_id = ? ORDER BY taken DESC LIMIT ?",
        )
        .bind(patient_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(VitalsEntry {
                    patient_id: row.get("patient_id"),
                    taken: parse_timestamp(row.get::<String, _>("taken").as_str(), "taken")?,
                    kind: row.get::<String, _>("kind").parse::<VitalKind>()?,
                    value: row.get("value"),
                    unit: row.get("unit"),
                })
            })
            .collect()
    }

    async fn medications(&self, patient_id: &str) -> Result<Vec<MedicationEntry>> {
        self.ensure_patient(patient_id).await?;
        let rows = sqlx::query(
            "SELECT patient_id, drug, dose, start, stop FROM meds \
             WHERE patient_id = ? ORDER BY start",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter()
            .map(|row| {
                let stop = row
                    .get::<Option<String>, _>("stop")
                    .map(|raw| parse_date(&raw, "stop"))
                    .transpose()?;
                Ok(MedicationEntry {
                    patient_id: row.get("patient_id"),
                    drug: row.get("drug"),
                    dose: row.get("dose"),
                    start: parse_date(row.get::<String, _>("start").as_str(), "start")?,
                    stop,
                })
            })
            .collect()
    }

    async fn history(&self, patient_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.ensure_patient(patient_id).await?;
        let rows = sqlx::query(
            "SELECT patient_id, kind, details, recorded, author FROM history \
             WHERE patient_id = ? ORDER BY recorded DESC LIMIT ?",
        )
        .bind(patient_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(HistoryEntry {
                    patient_id: row.get("patient_id"),
                    kind: row.get("kind"),
                    details: row.get("details"),
                    recorded: parse_timestamp(
                        row.get::<String, _>("recorded").as_str(),
                        "recorded",
                    )?,
                    author: row.get("author"),
                })
            })
            .collect()
    }

    async fn insert_patient(&self, patient: Patient) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO patients (id, first_name, last_name, sex, dob, contact) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&patient.id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.sex)
        .bind(patient.dob.to_string())
        .bind(&patient.contact)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn insert_vitals(&self, entry: VitalsEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        sqlx::query(
            "INSERT INTO vitals (patient_id, taken, kind, value, unit) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.patient_id)
        .bind(entry.taken.to_rfc3339())
        .bind(entry.kind.as_str())
        .bind(&entry.value)
        .bind(&entry.unit)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn insert_medication(&self, entry: MedicationEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        sqlx::query("INSERT INTO meds (patient_id, drug, dose, start, stop) VALUES (?, ?, ?, ?, ?)")
            .bind(&entry.patient_id)
            .bind(&entry.drug)
            .bind(&entry.dose)
            .bind(entry.start.to_string())
            .bind(entry.stop.map(|d| d.to_string()))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn insert_history(&self, entry: HistoryEntry) -> Result<()> {
        self.ensure_patient(&entry.patient_id).await?;
        sqlx::query(
            "INSERT INTO history (patient_id, kind, details, recorded, author) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.patient_id)
        .bind(&entry.kind)
        .bind(&entry.details)
        .bind(entry.recorded.to_rfc3339())
        .bind(&entry.author)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn fresh_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn ada() -> Patient {
        Patient {
            id: "P001".into(),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            sex: "F".into(),
            dob: NaiveDate::from_ymd_opt(1986, 3, 14).unwrap(),
            contact: None,
        }
    }

    #[tokio::test]
    async fn round_trip_demographics() {
        let store = fresh_store().await;
        store.insert_patient(ada()).await.unwrap();

        let patient = store.demographics("P001").await.unwrap();
        assert_eq!(patient.first_name, "Ada");
        assert_eq!(patient.dob, NaiveDate::from_ymd_opt(1986, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn unknown_patient_is_not_found() {
        let store = fresh_store().await;
        let err = store.demographics("unknown-id").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));

        let err = store.vitals("unknown-id", 3).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn vitals_limit_and_order() {
        let store = fresh_store().await;
        store.insert_patient(ada()).await.unwrap();

        for (offset, value) in [(3i64, "70"), (1, "72"), (2, "71")] {
            store
                .insert_vitals(VitalsEntry {
                    patient_id: "P001".into(),
                    taken: Utc::now() - chrono::Duration::hours(offset),
                    kind: VitalKind::HeartRate,
                    value: value.into(),
                    unit: "bpm".into(),
                })
                .await
                .unwrap();
        }

        let rows = store.vitals("P001", 2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, "72");
        assert_eq!(rows[1].value, "71");
    }

    #[tokio::test]
    async fn ongoing_medication_round_trips_none_stop() {
        let store = fresh_store().await;
        store.insert_patient(ada()).await.unwrap();
        store
            .insert_medication(MedicationEntry {
                patient_id: "P001".into(),
                drug: "Metformin".into(),
                dose: "500 mg bd".into(),
                start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                stop: None,
            })
            .await
            .unwrap();

        let meds = store.medications("P001").await.unwrap();
        assert_eq!(meds.len(), 1);
        assert!(meds[0].is_ongoing());
    }

    #[tokio::test]
    async fn insert_vitals_for_unknown_patient_fails() {
        let store = fresh_store().await;
        let err = store
            .insert_vitals(VitalsEntry {
                patient_id: "ghost".into(),
                taken: Utc::now(),
                kind: VitalKind::Weight,
                value: "65".into(),
                unit: "kg".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }
}
